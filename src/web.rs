// vve (vibe video editor)
// Copyright (C) 2026 Andrew Nissen

use crate::{
    analysis, config, export, frames, jobs, models, projects, stats, styling, suggestions, tools,
    transcripts, vibes,
};
use rocket::data::{Limits, ToByteUnit};
use rocket::form::{Form, FromForm};
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::response::Redirect;
use rocket::response::status::NotFound;
use rocket::serde::Serialize;
use rocket::serde::json::Json;
use rocket::{Request, catch, catchers, get, post, response::content, routes};
use rocket_dyn_templates::{Template, context};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Asset;

#[derive(RustEmbed)]
#[folder = "templates/"]
struct TemplateAssets;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

#[derive(FromForm)]
struct AuthForm {
    password: String,
    redirect: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

#[get("/")]
fn index() -> Redirect {
    Redirect::to("/app")
}

#[get("/api/health")]
fn health() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("OK"))
}

#[get("/app")]
fn app(
    _auth: crate::auth::AuthGuard,
) -> Result<content::RawHtml<std::borrow::Cow<'static, [u8]>>, NotFound<String>> {
    match Asset::get("frontend/index.html") {
        Some(content) => Ok(content::RawHtml(content.data)),
        None => Err(NotFound("index.html not found".to_string())),
    }
}

#[get("/assets/<file..>")]
fn assets(
    file: std::path::PathBuf,
) -> Result<(rocket::http::ContentType, std::borrow::Cow<'static, [u8]>), NotFound<String>> {
    let filename = file.to_string_lossy();
    match Asset::get(&filename) {
        Some(content) => {
            let content_type = match file.extension().and_then(|ext| ext.to_str()) {
                Some("html") => rocket::http::ContentType::HTML,
                Some("css") => rocket::http::ContentType::CSS,
                Some("js") => rocket::http::ContentType::JavaScript,
                Some("json") => rocket::http::ContentType::JSON,
                Some("png") => rocket::http::ContentType::PNG,
                Some("jpg") | Some("jpeg") => rocket::http::ContentType::JPEG,
                Some("gif") => rocket::http::ContentType::GIF,
                Some("svg") => rocket::http::ContentType::SVG,
                Some("ico") => rocket::http::ContentType::Icon,
                Some("otf") | Some("ttf") => rocket::http::ContentType::Binary,
                _ => rocket::http::ContentType::Binary,
            };
            Ok((content_type, content.data))
        }
        None => Err(NotFound(format!("Asset {} not found", filename))),
    }
}

#[get("/auth?<redirect>")]
fn auth_page(redirect: Option<String>) -> Template {
    Template::render(
        "auth",
        context! {
            redirect: redirect.unwrap_or_else(|| "/app".to_string()),
            error: None::<String>
        },
    )
}

#[post("/auth", data = "<form>")]
fn auth_submit(form: Form<AuthForm>, cookies: &CookieJar<'_>) -> Result<Redirect, Box<Template>> {
    let config = config::load_config_or_default();

    // No password configured means auth is open
    let expected_password = match config.password.as_deref() {
        Some(p) => p,
        None => {
            let redirect_url = form.redirect.as_deref().unwrap_or("/app");
            return Ok(Redirect::to(redirect_url.to_string()));
        }
    };

    if form.password == expected_password {
        let cookie = Cookie::build(("auth_token", form.password.clone()))
            .same_site(SameSite::Lax)
            .http_only(true)
            .path("/")
            .build();
        cookies.add(cookie);

        let redirect_url = form.redirect.as_deref().unwrap_or("/app");
        Ok(Redirect::to(redirect_url.to_string()))
    } else {
        Err(Box::new(Template::render(
            "auth",
            context! {
                redirect: form.redirect.as_deref().unwrap_or("/app"),
                error: "Invalid password"
            },
        )))
    }
}

#[get("/logout")]
fn logout(cookies: &CookieJar<'_>) -> Redirect {
    cookies.remove("auth_token");
    Redirect::to("/auth")
}

fn api_routes() -> Vec<rocket::Route> {
    routes![
        health,
        config::web_get_config,
        config::web_set_config,
        vibes::web_get_vibes,
        suggestions::web_vibe_suggestions,
        suggestions::web_project_suggestions,
        projects::web_create_project,
        projects::web_upload_project,
        projects::web_list_projects,
        projects::web_get_project,
        projects::web_delete_project,
        projects::web_save_project,
        projects::web_get_vibe,
        projects::web_select_vibe,
        analysis::web_analyze_project,
        jobs::web_get_job,
        jobs::web_cancel_job,
        transcripts::web_get_transcript,
        transcripts::web_set_segment,
        transcripts::web_delete_segment,
        transcripts::web_clean_fillers,
        transcripts::web_punctuate,
        transcripts::web_readability,
        transcripts::web_download_transcript,
        styling::web_get_style,
        styling::web_set_style,
        frames::web_preview_frame,
        export::web_export_project,
        export::web_download_export,
        stats::web_get_stats,
        models::web_list_models,
        tools::web_list_tools
    ]
}

#[catch(401)]
fn unauthorized(req: &Request) -> Result<Redirect, Status> {
    // Browser requests go to the login page, API callers get the bare status
    let accept_header = req.headers().get_one("Accept").unwrap_or("");
    let is_browser_request = accept_header.contains("text/html");

    if is_browser_request {
        let redirect_url = format!(
            "/auth?redirect={}",
            urlencoding::encode(req.uri().path().as_str())
        );
        Ok(Redirect::to(redirect_url))
    } else {
        Err(Status::Unauthorized)
    }
}

#[catch(404)]
fn not_found(req: &Request) -> Json<ApiResponse<String>> {
    Json(ApiResponse::error(format!(
        "No route for {} {}",
        req.method(),
        req.uri()
    )))
}

#[catch(500)]
fn internal_error() -> Json<ApiResponse<String>> {
    Json(ApiResponse::error("Internal server error".to_string()))
}

fn extract_templates() -> std::path::PathBuf {
    let temp_dir = std::env::temp_dir().join("vve_templates");
    std::fs::create_dir_all(&temp_dir).expect("Failed to create temp templates directory");

    for file_path in TemplateAssets::iter() {
        if let Some(content) = TemplateAssets::get(&file_path) {
            let target_path = temp_dir.join(file_path.as_ref());
            if let Some(parent) = target_path.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create template subdirectory");
            }
            std::fs::write(target_path, content.data.as_ref())
                .expect("Failed to write template file");
        }
    }

    temp_dir
}

fn build_figment(host: &str, port: u16) -> rocket::figment::Figment {
    let log_level = if cfg!(debug_assertions) {
        "normal"
    } else {
        "off"
    };

    // Uploads are whole video files
    let limits = Limits::default()
        .limit("file", 500.mebibytes())
        .limit("data-form", 510.mebibytes());

    rocket::Config::figment()
        .merge(("template_dir", extract_templates().to_string_lossy().to_string()))
        .merge(("address", host))
        .merge(("port", port))
        .merge(("log_level", log_level))
        .merge(("limits", limits))
}

pub async fn launch_server(host: &str, port: u16) -> Result<(), rocket::Error> {
    let mut all_routes = routes![index, auth_page, auth_submit, logout, app, assets];
    all_routes.extend(api_routes());

    jobs::process_jobs();

    rocket::custom(build_figment(host, port))
        .mount("/", all_routes)
        .register("/", catchers![unauthorized, not_found, internal_error])
        .attach(Template::fairing())
        .launch()
        .await?;

    Ok(())
}

pub async fn launch_api_server(host: &str, port: u16) -> Result<(), rocket::Error> {
    jobs::process_jobs();

    rocket::custom(build_figment(host, port))
        .mount("/", api_routes())
        .register("/", catchers![unauthorized, not_found, internal_error])
        .attach(Template::fairing())
        .launch()
        .await?;

    Ok(())
}
