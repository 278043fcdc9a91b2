use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use rust_embed::{EmbeddedFile, RustEmbed};

const INDEX: &str = "index.html";

/// UI pré-compilada, embutida no binário.
#[derive(RustEmbed)]
#[folder = "web/dist/"]
struct Assets;

/// Serve arquivos estáticos; rotas desconhecidas caem no `index.html`
/// (roteamento da SPA). Caminhos sob `/api` nunca chegam na UI.
pub async fn static_handler(uri: Uri) -> Response {
    let path = uri.path();
    if path == "/api" || path.starts_with("/api/") {
        return StatusCode::NOT_FOUND.into_response();
    }

    let path = match path.trim_start_matches('/') {
        "" => INDEX,
        p => p,
    };

    if let Some(file) = Assets::get(path) {
        return serve(path, file);
    }
    match Assets::get(INDEX) {
        Some(file) => serve(INDEX, file),
        None => (StatusCode::NOT_FOUND, "index.html não encontrado").into_response(),
    }
}

fn serve(path: &str, file: EmbeddedFile) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    ([(header::CONTENT_TYPE, mime.to_string())], file.data).into_response()
}
