use serde::{Deserialize, Serialize};

/// Roles del sistema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    SecurityGuard,
    #[serde(other)]
    Unknown,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::SecurityGuard => "SecurityGuard",
            UserRole::Unknown => "Unknown",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "Admin" => UserRole::Admin,
            "SecurityGuard" => UserRole::SecurityGuard,
            _ => UserRole::Unknown,
        }
    }
}

/// Claims del JWT emitido por el backend.
///
/// Sólo para mostrar datos y decidir qué pantallas se ofrecen; el backend
/// vuelve a autorizar cada operación.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // username
    pub role: UserRole,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub warehouse_code: Option<String>,
    #[serde(default)]
    pub site_code: Option<String>,
    pub exp: i64,
}

/// Usuario autenticado (derivado de los claims)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub username: String,
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
    pub warehouse_code: Option<String>,
    pub site_code: Option<String>,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Nombre para mostrar; si el token no trae nombre se usa el username
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }
}

impl From<JwtClaims> for CurrentUser {
    fn from(claims: JwtClaims) -> Self {
        Self {
            username: claims.sub,
            role: claims.role,
            first_name: claims.first_name.unwrap_or_default(),
            last_name: claims.last_name.unwrap_or_default(),
            warehouse_code: claims.warehouse_code,
            site_code: claims.site_code,
        }
    }
}

/// Request de login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response de login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}
