//! Outbound notifications and their delivery outcome

use std::fmt;

/// Selects the presentation of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    RegistrationCode,
    ResetCode,
    Generic,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegistrationCode => "registration-otp",
            Self::ResetCode => "reset-otp",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message addressed to one recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        kind: NotificationKind,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            kind,
        }
    }

    /// Email-ownership code sent after registration
    pub fn registration_code(to: impl Into<String>, code: &str) -> Self {
        Self::new(
            to,
            "Your OTP Code",
            format!("Your OTP code is: {code}"),
            NotificationKind::RegistrationCode,
        )
    }

    /// Code sent when a password reset is requested
    pub fn reset_code(to: impl Into<String>, code: &str) -> Self {
        Self::new(
            to,
            "Password Reset Code",
            format!("Your password reset code is: {code}"),
            NotificationKind::ResetCode,
        )
    }
}

/// Result of a dispatch attempt. Never rolls back caller state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryReport {
    Delivered { message_id: String },
    Failed { error: String },
}

impl DeliveryReport {
    pub fn delivered(message_id: impl Into<String>) -> Self {
        Self::Delivered {
            message_id: message_id.into(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    pub fn message_id(&self) -> Option<&str> {
        match self {
            Self::Delivered { message_id } => Some(message_id),
            Self::Failed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_code_carries_code() {
        let n = Notification::registration_code("a@x.com", "123456");
        assert_eq!(n.kind, NotificationKind::RegistrationCode);
        assert!(n.body.contains("123456"));
        assert_eq!(n.to, "a@x.com");
    }

    #[test]
    fn test_reset_code_kind() {
        let n = Notification::reset_code("a@x.com", "654321");
        assert_eq!(n.kind, NotificationKind::ResetCode);
        assert!(n.body.contains("654321"));
    }

    #[test]
    fn test_delivery_report() {
        let ok = DeliveryReport::delivered("msg-1");
        assert!(ok.is_success());
        assert_eq!(ok.message_id(), Some("msg-1"));

        let failed = DeliveryReport::failed("smtp down");
        assert!(!failed.is_success());
        assert_eq!(failed.message_id(), None);
    }
}
