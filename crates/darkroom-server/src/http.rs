//! One-shot HTTP endpoints.
//!
//! Every handler is stateless: the image travels in the request and the
//! result comes back as a PNG data URL. Pixel work runs on the blocking pool.

use axum::extract::{Form, Multipart, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use darkroom_core::codec::{bitmap_from_base64, bitmap_to_data_url};
use darkroom_core::decode::{decode_image, DecodeOptions};
use darkroom_core::encode::{encode_image, OutputFormat};
use darkroom_core::enhance::{self, BlurKind, EdgeKind};
use darkroom_core::histogram::histogram_of;
use darkroom_core::{
    apply_filters, Bitmap, CropRect, FilterParams, FlipDirection, ImageBackend, ImageError,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: Option<String>,
    pub size: usize,
    pub width: u32,
    pub height: u32,
    pub image: String,
}

// ── Form bodies ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ImageForm {
    pub image_data: String,
}

#[derive(Debug, Deserialize)]
pub struct CropForm {
    pub image_data: String,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Deserialize)]
pub struct RotateForm {
    pub image_data: String,
    pub degrees: f64,
}

#[derive(Debug, Deserialize)]
pub struct FlipForm {
    pub image_data: String,
    pub direction: String,
}

#[derive(Debug, Deserialize)]
pub struct FilterForm {
    pub image_data: String,
    pub filter_type: Option<String>,
    pub brightness: Option<f64>,
    pub contrast: Option<f64>,
    pub saturation: Option<f64>,
}

impl FilterForm {
    fn params(&self) -> FilterParams {
        FilterParams {
            // HTML forms send an empty string for "no filter"
            filter_type: self.filter_type.clone().filter(|f| !f.is_empty()),
            brightness: self.brightness,
            contrast: self.contrast,
            saturation: self.saturation,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ResizeForm {
    pub image_data: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct StretchForm {
    pub image_data: String,
    #[serde(default = "default_low_percent")]
    pub low_percent: f64,
    #[serde(default = "default_high_percent")]
    pub high_percent: f64,
}

fn default_low_percent() -> f64 {
    1.0
}

fn default_high_percent() -> f64 {
    99.0
}

#[derive(Debug, Deserialize)]
pub struct ThresholdForm {
    pub image_data: String,
    pub level: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct BlurForm {
    pub image_data: String,
    #[serde(default = "default_blur_type")]
    pub blur_type: String,
    pub sigma: Option<f32>,
    pub radius: Option<u32>,
}

fn default_blur_type() -> String {
    "gaussian".into()
}

#[derive(Debug, Deserialize)]
pub struct EdgeForm {
    pub image_data: String,
    #[serde(default = "default_edge_method")]
    pub method: String,
    pub low: Option<f32>,
    pub high: Option<f32>,
}

fn default_edge_method() -> String {
    "canny".into()
}

#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    pub format: Option<String>,
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Run CPU-bound work on the blocking pool.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("worker task failed: {e}")))?
}

fn decode_options(state: &AppState) -> DecodeOptions {
    DecodeOptions {
        auto_orient: state.config.auto_orient,
    }
}

/// Decode `image_data`, transform it, and answer with a PNG data URL.
async fn transform<F>(
    state: &AppState,
    image_data: String,
    op: F,
) -> Result<Json<ImageResponse>, ApiError>
where
    F: FnOnce(Bitmap) -> Result<Bitmap, ImageError> + Send + 'static,
{
    let options = decode_options(state);
    let image = blocking(move || {
        let input = bitmap_from_base64(&image_data, options)?;
        let output = op(input)?;
        Ok(bitmap_to_data_url(&output).map_err(ImageError::from)?)
    })
    .await?;
    Ok(Json(ImageResponse { image }))
}

struct UploadedFile {
    filename: Option<String>,
    bytes: Vec<u8>,
}

/// Pull the `file` field out of a multipart body. It must carry an
/// `image/*` content type.
async fn read_image_file(mut multipart: Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let is_image = field
            .content_type()
            .is_some_and(|ct| ct.starts_with("image/"));
        if !is_image {
            return Err(ApiError::bad_request("File must be an image"));
        }
        let filename = field.file_name().map(str::to_owned);
        let bytes = field.bytes().await?.to_vec();
        return Ok(UploadedFile { filename, bytes });
    }
    Err(ApiError::bad_request("Missing file field"))
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "darkroom image service" }))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "connections": state.registry.len(),
        "uptime_secs": state.started.elapsed().as_secs(),
    }))
}

pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, axum::extract::multipart::MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let file = read_image_file(multipart?).await?;
    let options = decode_options(&state);
    let size = file.bytes.len();
    tracing::debug!(filename = ?file.filename, size, "image uploaded");

    let (width, height, image) = blocking(move || {
        let bitmap = decode_image(&file.bytes, options)?;
        let url = bitmap_to_data_url(&bitmap).map_err(ImageError::from)?;
        Ok((bitmap.width(), bitmap.height(), url))
    })
    .await?;

    Ok(Json(UploadResponse {
        filename: file.filename,
        size,
        width,
        height,
        image,
    }))
}

pub async fn crop(
    State(state): State<AppState>,
    form: Result<Form<CropForm>, axum::extract::rejection::FormRejection>,
) -> Result<Json<ImageResponse>, ApiError> {
    let Form(req) = form?;
    let rect = CropRect::new(req.x, req.y, req.width, req.height);
    let backend = state.backend.clone();
    transform(&state, req.image_data, move |img| backend.crop(&img, rect)).await
}

pub async fn rotate(
    State(state): State<AppState>,
    form: Result<Form<RotateForm>, axum::extract::rejection::FormRejection>,
) -> Result<Json<ImageResponse>, ApiError> {
    let Form(req) = form?;
    if !req.degrees.is_finite() {
        return Err(ImageError::validation("Degrees must be a finite number").into());
    }
    let backend = state.backend.clone();
    transform(&state, req.image_data, move |img| {
        Ok(backend.rotate(&img, req.degrees))
    })
    .await
}

pub async fn flip(
    State(state): State<AppState>,
    form: Result<Form<FlipForm>, axum::extract::rejection::FormRejection>,
) -> Result<Json<ImageResponse>, ApiError> {
    let Form(req) = form?;
    let direction = FlipDirection::parse(&req.direction)?;
    let backend = state.backend.clone();
    transform(&state, req.image_data, move |img| {
        Ok(backend.flip(&img, direction))
    })
    .await
}

pub async fn filters(
    State(state): State<AppState>,
    form: Result<Form<FilterForm>, axum::extract::rejection::FormRejection>,
) -> Result<Json<ImageResponse>, ApiError> {
    let Form(req) = form?;
    let params = req.params();
    // Reject bad parameters before decoding anything.
    params.validate()?;
    params.filter_kind()?;
    let backend = state.backend.clone();
    transform(&state, req.image_data, move |img| {
        apply_filters(backend.as_ref(), &img, &params)
    })
    .await
}

pub async fn resize(
    State(state): State<AppState>,
    form: Result<Form<ResizeForm>, axum::extract::rejection::FormRejection>,
) -> Result<Json<ImageResponse>, ApiError> {
    let Form(req) = form?;
    let backend = state.backend.clone();
    transform(&state, req.image_data, move |img| {
        backend.resize(&img, req.width, req.height)
    })
    .await
}

pub async fn convert(
    State(state): State<AppState>,
    query: Result<Query<ConvertQuery>, axum::extract::rejection::QueryRejection>,
    multipart: Result<Multipart, axum::extract::multipart::MultipartRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let format = OutputFormat::parse(query.format.as_deref().unwrap_or("PNG"))
        .map_err(ImageError::from)?;
    let file = read_image_file(multipart?).await?;
    let options = decode_options(&state);

    let bytes = blocking(move || {
        let bitmap = decode_image(&file.bytes, options)?;
        Ok(encode_image(&bitmap, format).map_err(ImageError::from)?)
    })
    .await?;

    tracing::debug!(format = format.name(), size = bytes.len(), "image converted");
    Ok(([(header::CONTENT_TYPE, format.mime_type())], bytes).into_response())
}

pub async fn equalize(
    State(state): State<AppState>,
    form: Result<Form<ImageForm>, axum::extract::rejection::FormRejection>,
) -> Result<Json<ImageResponse>, ApiError> {
    let Form(req) = form?;
    transform(&state, req.image_data, |img| {
        Ok(enhance::equalize_histogram(&img))
    })
    .await
}

pub async fn stretch(
    State(state): State<AppState>,
    form: Result<Form<StretchForm>, axum::extract::rejection::FormRejection>,
) -> Result<Json<ImageResponse>, ApiError> {
    let Form(req) = form?;
    let (low, high) = (req.low_percent, req.high_percent);
    transform(&state, req.image_data, move |img| {
        enhance::stretch_histogram(&img, low, high)
    })
    .await
}

pub async fn threshold(
    State(state): State<AppState>,
    form: Result<Form<ThresholdForm>, axum::extract::rejection::FormRejection>,
) -> Result<Json<ImageResponse>, ApiError> {
    let Form(req) = form?;
    let level = req.level;
    transform(&state, req.image_data, move |img| {
        Ok(enhance::threshold(&img, level))
    })
    .await
}

pub async fn blur(
    State(state): State<AppState>,
    form: Result<Form<BlurForm>, axum::extract::rejection::FormRejection>,
) -> Result<Json<ImageResponse>, ApiError> {
    let Form(req) = form?;
    let kind = BlurKind::parse(&req.blur_type, req.sigma, req.radius)?;
    transform(&state, req.image_data, move |img| {
        Ok(enhance::blur_variant(&img, kind))
    })
    .await
}

pub async fn edges(
    State(state): State<AppState>,
    form: Result<Form<EdgeForm>, axum::extract::rejection::FormRejection>,
) -> Result<Json<ImageResponse>, ApiError> {
    let Form(req) = form?;
    let kind = EdgeKind::parse(&req.method, req.low, req.high)?;
    transform(&state, req.image_data, move |img| {
        Ok(enhance::detect_edges(&img, kind))
    })
    .await
}

pub async fn histogram(
    State(state): State<AppState>,
    form: Result<Form<ImageForm>, axum::extract::rejection::FormRejection>,
) -> Result<Json<Value>, ApiError> {
    let Form(req) = form?;
    let options = decode_options(&state);
    blocking(move || {
        let bitmap = bitmap_from_base64(&req.image_data, options)?;
        let hist = histogram_of(&bitmap);
        Ok(Json(json!({
            "width": bitmap.width(),
            "height": bitmap.height(),
            "red": hist.red.to_vec(),
            "green": hist.green.to_vec(),
            "blue": hist.blue.to_vec(),
            "luminance": hist.luminance.to_vec(),
            "highlight_clipping": hist.has_highlight_clipping(),
            "shadow_clipping": hist.has_shadow_clipping(),
        })))
    })
    .await
}
