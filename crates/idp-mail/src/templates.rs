//! HTML bodies for outgoing mail
//!
//! One layout for every kind: a heading chosen by kind, the message text,
//! the code set large for code-bearing kinds, and a product footer.

use idp_core::{Notification, NotificationKind};

/// Heading shown at the top of the message
pub fn heading(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::RegistrationCode => "🔑 OTP Verification",
        NotificationKind::ResetCode => "🔒 Reset Password",
        NotificationKind::Generic => "📢 Notification",
    }
}

/// Render the HTML part of `notification`
pub fn render_html(notification: &Notification, product_name: &str) -> String {
    let code_block = match notification.kind {
        NotificationKind::RegistrationCode | NotificationKind::ResetCode => trailing_code(
            &notification.body,
        )
        .map(|code| {
            format!(
                r#"<p style="text-align: center; font-size: 22px; font-weight: bold; letter-spacing: 4px; color: #e74c3c;">{}</p>"#,
                escape(code)
            )
        })
        .unwrap_or_default(),
        NotificationKind::Generic => String::new(),
    };

    format!(
        r#"<div style="max-width: 600px; margin: auto; font-family: Arial, sans-serif; border: 1px solid #ddd; border-radius: 8px; padding: 20px;">
  <h2 style="color: #2c3e50; text-align: center;">{heading}</h2>
  <p style="font-size: 16px; color: #555;">{body}</p>
  {code_block}
  <hr style="margin: 20px 0; border: 0.5px solid #ddd;">
  <p style="text-align: center; font-size: 14px; color: #888;">{footer} - All Rights Reserved</p>
</div>"#,
        heading = heading(notification.kind),
        body = escape(&notification.body),
        footer = escape(product_name),
    )
}

/// The all-digit final word of a message, if any
fn trailing_code(body: &str) -> Option<&str> {
    body.split_whitespace()
        .next_back()
        .filter(|word| !word.is_empty() && word.bytes().all(|b| b.is_ascii_digit()))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
