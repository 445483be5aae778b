//! Transactional email via AWS SESv2
//!
//! One sender function per template. Callers decide whether a failed send is
//! fatal (registration rolls the account back) or merely logged (password
//! reset must not reveal whether the account exists).

use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

async fn send_plain(
    ses: &SesClient,
    from: &str,
    to: &str,
    subject: &str,
    body_text: String,
) -> Result<(), BoxError> {
    let subject = Content::builder().data(subject).build()?;
    let body = Body::builder()
        .text(Content::builder().data(body_text).build()?)
        .build();
    let message = Message::builder().subject(subject).body(body).build();

    ses.send_email()
        .from_email_address(from)
        .destination(Destination::builder().to_addresses(to).build())
        .content(EmailContent::builder().simple(message).build())
        .send()
        .await?;
    Ok(())
}

pub async fn send_verification_email(
    ses: &SesClient,
    from: &str,
    to: &str,
    first_name: &str,
    verify_url: &str,
) -> Result<(), BoxError> {
    let body = format!(
        "Hi {first_name},\n\n\
         Welcome! Please verify your email address by opening the link below:\n\n\
         {verify_url}\n\n\
         The link is valid for 24 hours. If you did not create an account, you\n\
         can ignore this message."
    );
    send_plain(ses, from, to, "Verify your email address", body).await?;
    tracing::info!(to = to, "Verification email sent");
    Ok(())
}

pub async fn send_password_reset_email(
    ses: &SesClient,
    from: &str,
    to: &str,
    first_name: &str,
    reset_url: &str,
) -> Result<(), BoxError> {
    let body = format!(
        "Hi {first_name},\n\n\
         We received a request to reset your password. Open the link below to\n\
         choose a new one:\n\n\
         {reset_url}\n\n\
         The link is valid for 1 hour. If you did not request a reset, you can\n\
         ignore this message."
    );
    send_plain(ses, from, to, "Reset your password", body).await?;
    tracing::info!(to = to, "Password reset email sent");
    Ok(())
}
