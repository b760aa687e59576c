//! Login handler: request a verification code, confirm it, keep the token.

use secrecy::ExposeSecret;
use tracing::warn;

use crate::cli::{GlobalOpts, LoginArgs};
use crate::commands::Context;
use crate::error::CliError;

fn prompt(label: &str) -> Result<String, CliError> {
    let value: String = dialoguer::Input::new().with_prompt(label).interact_text()?;
    Ok(value.trim().to_owned())
}

pub async fn login(ctx: &Context, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let identifier = match args.login.or_else(|| ctx.profile.login.clone()) {
        Some(login) => login,
        None => prompt("Email or phone number")?,
    };
    if identifier.is_empty() {
        return Err(CliError::Validation {
            field: "login".into(),
            reason: "an email address or phone number is required".into(),
        });
    }

    ctx.engine.login(&identifier).await?;
    if !global.quiet {
        eprintln!("Verification code sent to {identifier}");
    }

    let code = match args.code {
        Some(code) => code,
        None => prompt("Verification code")?,
    };
    let verified = ctx.engine.verify(&code).await?;

    let mut config = ctx.config.clone();
    let profile = config.profiles.entry(ctx.profile_name.clone()).or_default();
    profile.login = Some(identifier);

    let mut plaintext = args.plaintext;
    if !plaintext {
        if let Err(e) = eerosync_config::store_user_token(&ctx.profile_name, &verified.user_token)
        {
            warn!(error = %e, "keyring unavailable, storing token in the config file");
            plaintext = true;
        }
    }
    profile.user_token = plaintext.then(|| verified.user_token.expose_secret().to_owned());

    if config.profiles.len() == 1 && config.default_profile.is_none() {
        config.default_profile = Some(ctx.profile_name.clone());
    }
    eerosync_config::save_config(&config)?;

    if !global.quiet {
        let who = verified.name.as_deref().unwrap_or("eero account");
        eprintln!("Logged in as {who} (profile '{}')", ctx.profile_name);
    }
    Ok(())
}
