//! Utilidades JWT
//!
//! Decodificación del token emitido por el backend SIN verificar la firma.
//! Los claims sólo sirven para mostrar datos del usuario y decidir qué
//! pantallas ofrecer; no son una frontera de seguridad. El backend vuelve a
//! autorizar cada operación.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::models::auth::{CurrentUser, JwtClaims};
use crate::utils::errors::{GateError, GateResult};

/// Validación que sólo decodifica: sin firma, sin `exp`, sin `aud`
fn display_only_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}

/// Decodificar los claims de un token (no verificado)
pub fn decode_claims(token: &str) -> GateResult<JwtClaims> {
    validate_token_format(token)?;

    let token_data = decode::<JwtClaims>(token, &DecodingKey::from_secret(&[]), &display_only_validation())
        .map_err(|e| GateError::Jwt(format!("Token inválido: {}", e)))?;

    Ok(token_data.claims)
}

/// Usuario actual a partir del token (no verificado)
pub fn current_user_from_token(token: &str) -> GateResult<CurrentUser> {
    decode_claims(token).map(CurrentUser::from)
}

/// Verificar si un token ha expirado
pub fn is_token_expired(claims: &JwtClaims) -> bool {
    let now = chrono::Utc::now().timestamp();
    claims.exp < now
}

/// Obtener tiempo restante de un token (segundos)
pub fn get_token_remaining_time(claims: &JwtClaims) -> i64 {
    let now = chrono::Utc::now().timestamp();
    (claims.exp - now).max(0)
}

/// Validar formato de token (básico)
pub fn validate_token_format(token: &str) -> GateResult<()> {
    if token.is_empty() {
        return Err(GateError::Jwt("Token no puede estar vacío".to_string()));
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(GateError::Jwt("Token debe tener 3 partes separadas por puntos".to_string()));
    }

    Ok(())
}

/// Valor del header Authorization
pub fn bearer_header(token: &str) -> String {
    format!("Bearer {}", token)
}
