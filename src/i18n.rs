use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Language::En),
            "ar" => Some(Language::Ar),
            _ => None,
        }
    }

    pub fn is_rtl(self) -> bool {
        self == Language::Ar
    }

    pub fn t(self, key: &str) -> String {
        t(key, self)
    }
}

// (key, english, arabic)
const ENTRIES: &[(&str, &str, &str)] = &[
    ("app.name", "Shakwa", "شكوى"),
    ("common.ok", "OK", "حسناً"),
    ("common.cancel", "Cancel", "إلغاء"),
    ("common.save", "Save", "حفظ"),
    ("common.delete", "Delete", "حذف"),
    ("common.edit", "Edit", "تعديل"),
    ("common.close", "Close", "إغلاق"),
    ("common.back", "Back", "رجوع"),
    ("common.loading", "Loading...", "جاري التحميل..."),
    ("common.error", "Error", "خطأ"),
    ("common.success", "Success", "نجح"),
    ("navigation.myComplaints", "My Complaints", "شكاويّي"),
    ("navigation.addComplaint", "Add Complaint", "شكوى جديدة"),
    ("navigation.profile", "Profile", "الملف الشخصي"),
    ("navigation.settings", "Settings", "الإعدادات"),
    ("navigation.logout", "Logout", "تسجيل الخروج"),
    ("settings.theme", "Theme", "المظهر"),
    ("settings.language", "Language", "اللغة"),
    ("settings.lightMode", "Light Mode", "الوضع الفاتح"),
    ("settings.darkMode", "Dark Mode", "الوضع الداكن"),
    ("settings.english", "English", "English"),
    ("settings.arabic", "العربية", "العربية"),
    ("onboarding.title1", "Report a problem", "أبلغ عن مشكلة"),
    ("onboarding.body1", "Submit maintenance, cleanliness and safety complaints in a few taps.", "قدّم شكاوى الصيانة والنظافة والسلامة بخطوات بسيطة."),
    ("onboarding.title2", "Attach evidence", "أرفق الأدلة"),
    ("onboarding.body2", "Add photos and files so the team understands the issue.", "أضف صوراً وملفات لتوضيح المشكلة للفريق."),
    ("onboarding.title3", "Follow every step", "تابع كل خطوة"),
    ("onboarding.body3", "Track the status of your complaints and get notified on updates.", "تابع حالة شكاواك واستلم إشعارات عند التحديث."),
    ("onboarding.next", "Next", "التالي"),
    ("onboarding.start", "Get started", "ابدأ الآن"),
    ("auth.login", "Log in", "تسجيل الدخول"),
    ("auth.register", "Create account", "إنشاء حساب جديد"),
    ("auth.phone", "Phone number", "رقم الهاتف"),
    ("auth.password", "Password", "كلمة المرور"),
    ("auth.fullName", "Full name (optional)", "الاسم الكامل (اختياري)"),
    ("auth.haveAccount", "Already have an account? Log in", "لديك حساب؟ سجّل الدخول"),
    ("auth.loginFailed", "Login failed", "فشل تسجيل الدخول"),
    ("auth.registered", "Registered, log in now", "تم التسجيل، سجّل الدخول الآن"),
    ("auth.credentialsRequired", "Please enter your phone number and password", "الرجاء إدخال رقم الهاتف وكلمة المرور"),
    ("auth.invalidPhone", "Phone number may only contain digits", "رقم الهاتف يجب أن يحتوي على أرقام فقط"),
    ("complaints.empty", "No complaints yet", "لا توجد شكاوى بعد"),
    ("complaints.status", "Status", "الحالة"),
    ("complaints.attachments", "Attachments", "المرفقات"),
    ("complaints.noAttachments", "No attachments", "لا توجد مرفقات"),
    ("complaints.timeline", "Progress", "مراحل الشكوى"),
    ("complaints.localOnly", "Saved on this device only", "محفوظة على هذا الجهاز فقط"),
    ("complaints.loadFailed", "Could not load complaints", "تعذر تحميل الشكاوى"),
    ("complaints.refresh", "Refresh", "تحديث"),
    ("complaints.location", "Location", "الموقع"),
    ("complaints.priority", "Priority", "الأولوية"),
    ("form.header", "Add complaint", "إضافة شكوى"),
    ("form.subtitle", "Send your complaint with attachments, quick and easy", "أرسل شكواك مع مرفقات، سهل وسريع"),
    ("form.title", "Title", "العنوان"),
    ("form.description", "Description", "الوصف"),
    ("form.type", "Complaint type", "نوع الشكوى"),
    ("form.otherType", "Or type another kind", "أو اكتب نوع آخر"),
    ("form.location", "Location (optional)", "الموقع (اختياري)"),
    ("form.priority", "Priority", "الأولوية"),
    ("form.phone", "Contact phone (optional)", "هاتف التواصل (اختياري)"),
    ("form.email", "Contact email (optional)", "البريد الإلكتروني (اختياري)"),
    ("form.addAttachment", "Add attachment", "أضف مرفق"),
    ("form.pickImage", "Choose image", "اختيار صورة"),
    ("form.pickFile", "Choose file", "اختيار ملف"),
    ("form.submit", "Send", "إرسال"),
    ("form.sent", "Complaint sent", "تم إرسال الشكوى"),
    ("form.sendFailed", "Sending failed", "فشل الإرسال"),
    ("form.savedLocally", "No connection, the complaint was saved on this device", "لا يوجد اتصال، تم حفظ الشكوى على الجهاز"),
    ("form.titleAndTypeRequired", "Please enter the title and type", "الرجاء إدخال العنوان والنوع"),
    ("form.invalidEmail", "Please enter a valid email", "الرجاء إدخال بريد إلكتروني صحيح"),
    ("types.services", "Services", "خدمات"),
    ("types.cleanliness", "Cleanliness", "نظافة"),
    ("types.safety", "Safety", "سلامة"),
    ("types.other", "Other", "آخر"),
    ("status.pending", "Pending", "قيد الانتظار"),
    ("status.running", "In progress", "قيد التنفيذ"),
    ("status.resolved", "Resolved", "تم الحل"),
    ("status.rejected", "Rejected", "مرفوضة"),
    ("priority.none", "Not set", "غير محددة"),
    ("priority.low", "Low", "منخفضة"),
    ("priority.medium", "Medium", "متوسطة"),
    ("priority.high", "High", "عالية"),
    ("notifications.title", "Notifications", "الإشعارات"),
    ("notifications.empty", "No notifications", "لا توجد إشعارات"),
    ("notifications.markAllRead", "Mark all as read", "تحديد الكل كمقروء"),
    ("profile.fullName", "Full name", "الاسم الكامل"),
    ("profile.email", "Email", "البريد الإلكتروني"),
    ("profile.phone", "Phone", "الهاتف"),
    ("profile.role", "Role", "الدور"),
    ("profile.saved", "Profile updated", "تم تحديث الملف الشخصي"),
    ("time.justNow", "just now", "الآن"),
    ("time.minutesAgo", "{n} min ago", "منذ {n} دقيقة"),
    ("time.hoursAgo", "{n} h ago", "منذ {n} ساعة"),
    ("time.daysAgo", "{n} d ago", "منذ {n} يوم"),
];

static TABLE: Lazy<HashMap<&'static str, (&'static str, &'static str)>> =
    Lazy::new(|| ENTRIES.iter().map(|(k, en, ar)| (*k, (*en, *ar))).collect());

/// Looks up a dotted key; unknown keys come back unchanged.
pub fn t(key: &str, language: Language) -> String {
    match TABLE.get(key) {
        Some((en, ar)) => match language {
            Language::En => en.to_string(),
            Language::Ar => ar.to_string(),
        },
        None => key.to_string(),
    }
}

pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>, language: Language) -> String {
    let elapsed = now.signed_duration_since(at);
    let (key, n) = if elapsed.num_minutes() < 1 {
        return t("time.justNow", language);
    } else if elapsed.num_hours() < 1 {
        ("time.minutesAgo", elapsed.num_minutes())
    } else if elapsed.num_days() < 1 {
        ("time.hoursAgo", elapsed.num_hours())
    } else {
        ("time.daysAgo", elapsed.num_days())
    };
    t(key, language).replace("{n}", &n.to_string())
}
