use crate::i18n::Language;
use crate::storage::{keys, Storage};
use crate::theme::{Palette, ThemeType};

#[derive(Debug)]
pub struct ThemeState {
    storage: Storage,
    current: ThemeType,
}

impl ThemeState {
    pub fn load(storage: Storage) -> Self {
        let current = match storage.get(keys::THEME) {
            Ok(saved) => saved.as_deref().and_then(ThemeType::parse).unwrap_or_default(),
            Err(e) => {
                log::warn!("Failed to load theme preference: {e}");
                ThemeType::default()
            }
        };
        Self { storage, current }
    }

    pub fn current(&self) -> ThemeType {
        self.current
    }

    pub fn palette(&self) -> &'static Palette {
        self.current.palette()
    }

    pub fn set(&mut self, theme: ThemeType) {
        self.current = theme;
        if let Err(e) = self.storage.set(keys::THEME, theme.as_str()) {
            log::warn!("Failed to save theme preference: {e}");
        }
    }

    pub fn toggle(&mut self) -> ThemeType {
        self.set(self.current.toggled());
        self.current
    }
}

#[derive(Debug)]
pub struct LanguageState {
    storage: Storage,
    current: Language,
}

impl LanguageState {
    pub fn load(storage: Storage) -> Self {
        let current = match storage.get(keys::LANGUAGE) {
            Ok(saved) => saved.as_deref().and_then(Language::from_code).unwrap_or_default(),
            Err(e) => {
                log::warn!("Failed to load language preference: {e}");
                Language::default()
            }
        };
        Self { storage, current }
    }

    pub fn current(&self) -> Language {
        self.current
    }

    pub fn is_rtl(&self) -> bool {
        self.current.is_rtl()
    }

    pub fn t(&self, key: &str) -> String {
        self.current.t(key)
    }

    pub fn set(&mut self, language: Language) {
        self.current = language;
        if let Err(e) = self.storage.set(keys::LANGUAGE, language.code()) {
            log::warn!("Failed to save language preference: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::temp_storage;

    #[test]
    fn theme_defaults_to_light_and_persists_toggle() {
        let (_dir, storage) = temp_storage();
        let mut theme = ThemeState::load(storage.clone());
        assert_eq!(theme.current(), ThemeType::Light);
        assert_eq!(theme.toggle(), ThemeType::Dark);

        let reloaded = ThemeState::load(storage);
        assert_eq!(reloaded.current(), ThemeType::Dark);
        assert_eq!(reloaded.palette().background, "#000000");
    }

    #[test]
    fn garbage_theme_value_is_ignored() {
        let (_dir, storage) = temp_storage();
        storage.set(keys::THEME, "neon").unwrap();
        assert_eq!(ThemeState::load(storage).current(), ThemeType::Light);
    }

    #[test]
    fn language_persists_and_translates() {
        let (_dir, storage) = temp_storage();
        let mut lang = LanguageState::load(storage.clone());
        assert_eq!(lang.current(), Language::En);
        lang.set(Language::Ar);
        assert!(lang.is_rtl());
        assert_eq!(lang.t("common.cancel"), "إلغاء");

        assert_eq!(LanguageState::load(storage).current(), Language::Ar);
    }
}
