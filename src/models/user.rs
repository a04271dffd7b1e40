// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Paciente com cadastro (tabela `users`). Não confundir com o administrador,
// que não tem linha no banco.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub id: Uuid,
    pub username: Option<String>,
    pub login: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    #[schema(example = "+79001234567")]
    pub number: Option<String>,
    pub age: Option<i32>,
    pub created_at: DateTime<Utc>,
    #[schema(example = "not_used")]
    pub cupon_status: Option<String>,
}

impl RegisteredUser {
    /// "Sobrenome Nome Patronímico", caindo para username e login.
    pub fn display_name(&self) -> Option<String> {
        let full: Vec<&str> = [&self.last_name, &self.name, &self.middle_name]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        if !full.is_empty() {
            return Some(full.join(" "));
        }
        [&self.username, &self.login]
            .into_iter()
            .filter_map(|p| p.clone())
            .find(|p| !p.trim().is_empty())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::user;

    #[test]
    fn display_name_joins_parts_in_russian_order() {
        let mut u = user("Ivan", None);
        u.last_name = Some("Petrov".into());
        u.middle_name = Some("Sergeevich".into());
        assert_eq!(u.display_name().as_deref(), Some("Petrov Ivan Sergeevich"));
    }

    #[test]
    fn display_name_falls_back_to_username_then_login() {
        let mut u = user("", None);
        u.login = Some("ivan_login".into());
        assert_eq!(u.display_name().as_deref(), Some("ivan_login"));
        u.username = Some("ivan".into());
        assert_eq!(u.display_name().as_deref(), Some("ivan"));
        u.username = None;
        u.login = None;
        assert_eq!(u.display_name(), None);
    }
}
