use crate::commands::{self, prompt_password, prompt_username};
use crate::context::AppContext;
use crate::format;
use libberth::validator::{CredentialValidator, RegistryCredentialRecord};
use libberth::{Password, RegistryResolver};
use std::sync::Arc;

/// Validates a private registry credential against the registry.
pub(crate) async fn login(
    resolver: Arc<dyn RegistryResolver>,
    url: &str,
    username: &str,
    password: &str,
) -> Result<RegistryCredentialRecord, String> {
    CredentialValidator::new(resolver)
        .validate(url, username, Password::Plain(password.to_string()), 0)
        .await
        .map_err(|e| e.to_string())
}

/// Handle the login command
pub async fn handle_login(
    ctx: &AppContext,
    url: &str,
    username: Option<&str>,
    password: Option<&str>,
) {
    let username = prompt_username(username).unwrap_or_else(|e| format::fail(&e));
    let password = prompt_password(password).unwrap_or_else(|e| format::fail(&e));
    let resolver = commands::resolver(ctx).unwrap_or_else(|e| format::fail(&e));

    let spinner = format::spinner(&format!("Checking credentials for {}...", url));
    let result = login(resolver, url, &username, &password).await;
    spinner.finish_and_clear();

    match result {
        Ok(record) => format::success(&format!(
            "Credentials for '{}' on {} are valid",
            record.credentials.user, record.credentials.url
        )),
        Err(e) => format::fail(&e),
    }
}

#[cfg(test)]
#[path = "login_tests.rs"]
mod tests;
