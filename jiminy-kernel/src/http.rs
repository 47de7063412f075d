/**
 * API HTTP JIMINY - Exposition de l'état du parc de devices
 *
 * RÔLE :
 * Ce module expose l'unique route de consultation du kernel :
 * GET /jiminy/devices renvoie l'état le plus récent de chaque device.
 *
 * FONCTIONNEMENT :
 * - Serveur Axum sur le port configuré (8080 par défaut)
 * - La réponse est sérialisée depuis un snapshot du registre : une écriture
 *   concurrente ne peut pas modifier le corps en cours d'envoi
 * - Toute autre méthode que GET reçoit un 405 avec la méthode en corps
 *
 * UTILITÉ DANS JIMINY :
 * 🎯 Supervision : dashboard, curl, scripts d'inventaire
 * 🎯 Lecture seule : aucune écriture registre ne passe par HTTP
 */

use crate::state::DeviceRegistry;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{extract::State, Json, Router};

#[derive(Clone)]
pub struct AppState {
    pub registry: DeviceRegistry,
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/jiminy/devices", any(devices))
        .with_state(app_state)
}

// GET /jiminy/devices (snapshot du parc) ; autres méthodes : 405 + méthode en corps
async fn devices(State(app): State<AppState>, method: Method) -> Response {
    if method == Method::GET {
        Json(app.registry.snapshot()).into_response()
    } else {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::CONTENT_TYPE, "application/json")],
            method.to_string(),
        )
            .into_response()
    }
}
