use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationErrors};

use super::{present, reject_nulls};

/// A registered user, exactly as stored. The credential is kept in plain text
/// and is part of the listing payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id_usuario: i32,
    pub nome: String,
    pub email: String,
    pub senha: String,
}

/// Registration body. Fields are optional at the serde level so that an absent
/// field is reported as a validation failure rather than a parse error.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UserInput {
    #[validate(required)]
    pub nome: Option<String>,
    #[validate(required)]
    pub email: Option<String>,
    #[validate(required)]
    pub senha: Option<String>,
}

/// A user ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub nome: String,
    pub email: String,
    pub senha: String,
}

impl TryFrom<UserInput> for NewUser {
    type Error = ValidationErrors;

    fn try_from(input: UserInput) -> Result<Self, Self::Error> {
        input.validate()?;
        let (Some(nome), Some(email), Some(senha)) = (input.nome, input.email, input.senha) else {
            return Err(ValidationErrors::new());
        };
        Ok(NewUser { nome, email, senha })
    }
}

/// Update body as sent: any subset of the user's fields, none of which may
/// be `null`.
#[derive(Debug, Default, Deserialize)]
pub struct UserChangesInput {
    #[serde(default, deserialize_with = "present")]
    pub nome: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub senha: Option<Option<String>>,
}

/// Changes to apply to a user. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub senha: Option<String>,
}

impl TryFrom<UserChangesInput> for UserChanges {
    type Error = ValidationErrors;

    fn try_from(input: UserChangesInput) -> Result<Self, Self::Error> {
        reject_nulls(&[
            ("nome", matches!(input.nome, Some(None))),
            ("email", matches!(input.email, Some(None))),
            ("senha", matches!(input.senha, Some(None))),
        ])?;
        Ok(UserChanges {
            nome: input.nome.flatten(),
            email: input.email.flatten(),
            senha: input.senha.flatten(),
        })
    }
}

impl UserChanges {
    /// Applies the changes in place and reports whether any value differs
    /// from what was stored.
    pub fn apply(&self, user: &mut User) -> bool {
        let mut changed = false;
        for (field, value) in [
            (&mut user.nome, &self.nome),
            (&mut user.email, &self.email),
            (&mut user.senha, &self.senha),
        ] {
            if let Some(value) = value {
                if *field != *value {
                    *field = value.clone();
                    changed = true;
                }
            }
        }
        changed
    }
}
