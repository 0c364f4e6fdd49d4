#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeType {
    #[default]
    Light,
    Dark,
}

impl ThemeType {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeType::Light => "light",
            ThemeType::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(ThemeType::Light),
            "dark" => Some(ThemeType::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeType::Light => ThemeType::Dark,
            ThemeType::Dark => ThemeType::Light,
        }
    }

    pub fn palette(self) -> &'static Palette {
        match self {
            ThemeType::Light => &LIGHT,
            ThemeType::Dark => &DARK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub background: &'static str,
    pub surface: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
    pub border: &'static str,
    pub error: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
}

pub const LIGHT: Palette = Palette {
    primary: "#2563EB",
    secondary: "#06B6D4",
    background: "#F8FAFC",
    surface: "#FFFFFF",
    text: "#0F172A",
    text_secondary: "#475569",
    border: "#E2E8F0",
    error: "#DC2626",
    success: "#16A34A",
    warning: "#EA580C",
};

pub const DARK: Palette = Palette {
    primary: "#0A84FF",
    secondary: "#30B0C5",
    background: "#000000",
    surface: "#1C1C1E",
    text: "#FFFFFF",
    text_secondary: "#999999",
    border: "#3A3A3C",
    error: "#FF453A",
    success: "#32D74B",
    warning: "#FF9500",
};

impl Palette {
    /// Stylesheet installed on the display; libadwaita named colours plus our status classes.
    pub fn css(&self) -> String {
        format!(
            r#"
@define-color accent_bg_color {primary};
@define-color accent_color {primary};
@define-color window_bg_color {background};
@define-color view_bg_color {surface};
@define-color card_bg_color {surface};
@define-color window_fg_color {text};
@define-color view_fg_color {text};
@define-color error_color {error};
@define-color success_color {success};
@define-color warning_color {warning};

.status-pending {{ color: {warning}; }}
.status-running {{ color: {secondary}; }}
.status-resolved {{ color: {success}; }}
.status-rejected {{ color: {error}; }}
.step-upcoming {{ color: {text_secondary}; }}
.step-done {{ color: {success}; }}
.step-current {{ color: {primary}; font-weight: bold; }}
.notification-complaint {{ color: {primary}; }}
.notification-update {{ color: {success}; }}
.notification-alert {{ color: {warning}; }}
.notification-system {{ color: {secondary}; }}
.notification-unread {{ font-weight: bold; }}
.unread-badge {{ background-color: {error}; color: #FFFFFF; border-radius: 9px; padding: 0 5px; font-size: smaller; }}
.local-badge {{ color: {text_secondary}; font-style: italic; }}
.attachment-row {{ border: 1px solid {border}; border-radius: 8px; padding: 6px; }}
"#,
            primary = self.primary,
            secondary = self.secondary,
            background = self.background,
            surface = self.surface,
            text = self.text,
            text_secondary = self.text_secondary,
            border = self.border,
            error = self.error,
            success = self.success,
            warning = self.warning,
        )
    }
}
