//! Signing in and out, and remembering the session between invocations.
//!
//! The backend hands out an opaque token; only that token is kept on disk.
use crate::smartcollab::connectors::{self, AuthProvider, Session};
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Name is required")]
    NameRequired,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Password must be at least {} characters", MIN_PASSWORD_LEN)]
    PasswordTooShort,
    #[error("You are not logged in. Run `login` first")]
    NotLoggedIn,
    #[error(transparent)]
    Backend(#[from] connectors::Error),
    #[error("Cannot access session file: {0}")]
    Io(#[from] std::io::Error),
}

fn validate_email(email: &str) -> Result<(), Error> {
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(Error::InvalidEmail),
    }
}

pub struct SessionService<'a, AUTH: AuthProvider> {
    auth: &'a AUTH,
    session_file: &'a Path,
}

impl<'a, AUTH: AuthProvider> SessionService<'a, AUTH> {
    pub fn new(auth: &'a AUTH, session_file: &'a Path) -> Self {
        Self { auth, session_file }
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<Session, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::NameRequired);
        }
        let email = email.trim();
        validate_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::PasswordTooShort);
        }
        let session = self.auth.sign_up(name, email, password).await?;
        self.remember(&session).await?;
        Ok(session)
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, Error> {
        let email = email.trim();
        validate_email(email)?;
        let session = self.auth.sign_in(email, password).await?;
        self.remember(&session).await?;
        info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    /// Ends the backend session and forgets the local token.
    #[tracing::instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), Error> {
        let token = self.stored_token().await?.ok_or(Error::NotLoggedIn)?;
        self.auth.sign_out(&token).await?;
        tokio::fs::remove_file(self.session_file).await?;
        Ok(())
    }

    /// The session of whoever is logged in on this machine.
    #[tracing::instrument(skip(self))]
    pub async fn current(&self) -> Result<Session, Error> {
        let token = self.stored_token().await?.ok_or(Error::NotLoggedIn)?;
        let user = self.auth.current_user(&token).await?;
        Ok(Session { token, user })
    }

    async fn remember(&self, session: &Session) -> Result<(), Error> {
        tokio::fs::write(self.session_file, &session.token).await?;
        Ok(())
    }

    async fn stored_token(&self) -> Result<Option<String>, Error> {
        match tokio::fs::read_to_string(self.session_file).await {
            Ok(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
            Ok(_) => Ok(None),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
