use super::AppState;
use crate::{
    error::{GenError, Result},
    models::{
        AvatarRequest, CanonicalResult, ChatResponse, GenerateRequest, HealthResponse,
        ImagesResponse, PolishResponse, PortraitRequest, PredictionInput, PromptRequest,
    },
    normalizer::{collapse_whitespace, extract_text, normalize},
    styles::{self, StylePreset, REFERENCE_IDENTITY_HINT},
};
use actix_web::{web, HttpResponse};
use uuid::Uuid;

const POLISH_INSTRUCTION: &str = "You are a prompt engineer for image generation. Rewrite the \
     user's prompt into concise, vivid English suitable for image models. Keep the intent, avoid \
     brand names and NSFW content. Return ONLY the rewritten prompt.";

pub async fn generate(
    state: web::Data<AppState>,
    body: web::Json<GenerateRequest>,
) -> Result<HttpResponse> {
    let req_id = request_id();
    let request = body.into_inner();
    let prompt = require_prompt(&request.prompt)?;
    ensure_token(&state)?;

    let prompt = match request.aspect_ratio.as_deref().map(str::trim) {
        Some(ratio) if !ratio.is_empty() => format!("{}\n(aspect ratio: {})", prompt, ratio),
        _ => prompt,
    };

    let sources = request
        .history_image
        .iter()
        .chain(request.image_base64.iter())
        .chain(request.attached_images.iter())
        .map(String::as_str);
    let references = prepare_references(&state, &req_id, sources).await?;

    log::info!(
        "[{}] generate: prompt_len={}, references={}",
        req_id,
        prompt.len(),
        references.len()
    );

    let images = generate_images(&state, &req_id, prompt, references).await?;
    Ok(images_response(images))
}

pub async fn portrait(
    state: web::Data<AppState>,
    body: web::Json<PortraitRequest>,
) -> Result<HttpResponse> {
    let req_id = request_id();
    let request = body.into_inner();
    let style = styles::find_style(&request.style).ok_or_else(|| {
        GenError::InvalidInput(format!(
            "Style must be one of: {}",
            styles::style_names().join(", ")
        ))
    })?;
    ensure_token(&state)?;

    let reference = non_empty(request.image_base64.as_deref());
    let prompt = styled_prompt(style, request.prompt.as_deref(), reference.is_some());
    let references = prepare_references(&state, &req_id, reference.into_iter()).await?;

    log::info!("[{}] portrait: style={}, references={}", req_id, style.name, references.len());

    let images = generate_images(&state, &req_id, prompt, references).await?;
    Ok(images_response(images))
}

pub async fn avatar(
    state: web::Data<AppState>,
    body: web::Json<AvatarRequest>,
) -> Result<HttpResponse> {
    let req_id = request_id();
    let request = body.into_inner();
    let style = styles::find_style(&request.style_id)
        .ok_or_else(|| GenError::InvalidInput("invalid styleId".into()))?;
    ensure_token(&state)?;

    let reference = non_empty(request.image_url.as_deref());
    let prompt = styled_prompt(style, request.prompt_addon.as_deref(), reference.is_some());
    let references = prepare_references(&state, &req_id, reference.into_iter()).await?;

    log::info!("[{}] avatar: style={}, references={}", req_id, style.name, references.len());

    let images = generate_images(&state, &req_id, prompt, references).await?;
    Ok(images_response(images))
}

/// Never fails: without a configured LLM, or when it errors, the prompt is
/// only whitespace-cleaned.
pub async fn polish(state: web::Data<AppState>, body: web::Json<PromptRequest>) -> HttpResponse {
    let req_id = request_id();
    let src = body.prompt.trim();
    if src.is_empty() {
        return HttpResponse::Ok().json(PolishResponse {
            prompt: String::new(),
        });
    }

    let cleaned = collapse_whitespace(src);
    let replicate = &state.config.replicate;
    let model = match (&replicate.llm_model, replicate.has_token()) {
        (Some(model), true) => model,
        _ => {
            log::debug!("[{}] polish: no LLM configured, using local cleanup", req_id);
            return HttpResponse::Ok().json(PolishResponse { prompt: cleaned });
        }
    };

    let input = PredictionInput::text(
        format!(
            "{}\n\nUser prompt:\n{}\n\nRewritten prompt:",
            POLISH_INSTRUCTION, src
        ),
        200,
        0.4,
    );

    let prompt = match state.client.run(model, &input).await {
        Ok(raw) => {
            let polished = extract_text(&raw);
            if polished.is_empty() {
                src.to_string()
            } else {
                polished
            }
        }
        Err(e) => {
            log::warn!("[{}] polish failed, using local cleanup: {}", req_id, e);
            cleaned
        }
    };

    HttpResponse::Ok().json(PolishResponse { prompt })
}

pub async fn chat(
    state: web::Data<AppState>,
    body: web::Json<PromptRequest>,
) -> Result<HttpResponse> {
    let req_id = request_id();
    let prompt = require_prompt(&body.prompt)?;
    ensure_token(&state)?;
    let model = state
        .config
        .replicate
        .llm_model
        .as_deref()
        .ok_or_else(|| GenError::ConfigError("REPLICATE_LLM_MODEL not configured".into()))?;

    log::info!("[{}] chat: model={}, prompt_len={}", req_id, model, prompt.len());

    let raw = state
        .client
        .run(model, &PredictionInput::text(prompt, 1000, 0.7))
        .await?;
    let output = extract_text(&raw);
    if output.is_empty() {
        log::error!("[{}] chat: empty output from model", req_id);
        return Err(GenError::EmptyOutput("Model returned empty response".into()));
    }

    Ok(HttpResponse::Ok().json(ChatResponse { output }))
}

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let replicate = &state.config.replicate;
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        has_token: replicate.has_token(),
        llm: replicate.llm_model.clone(),
        image_model: replicate.image_model.clone(),
    })
}

fn request_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn require_prompt(prompt: &str) -> Result<String> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(GenError::InvalidInput(
            "prompt is required and must be a non-empty string".into(),
        ));
    }
    Ok(prompt.to_string())
}

fn ensure_token(state: &AppState) -> Result<()> {
    if state.config.replicate.has_token() {
        Ok(())
    } else {
        log::error!("REPLICATE_API_TOKEN is not configured");
        Err(GenError::ConfigError("REPLICATE_API_TOKEN not configured".into()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn styled_prompt(style: &StylePreset, addon: Option<&str>, has_reference: bool) -> String {
    let mut parts = vec![style.prompt];
    if let Some(addon) = non_empty(addon) {
        parts.push(addon);
    }
    if has_reference {
        parts.push(REFERENCE_IDENTITY_HINT);
    }
    collapse_whitespace(&parts.join(" "))
}

/// Turns user-supplied references into URLs the model can fetch. `data:`
/// URIs are uploaded, `blob:` URLs are browser-local and skipped.
async fn prepare_references<'a, I>(state: &AppState, req_id: &str, sources: I) -> Result<Vec<String>>
where
    I: Iterator<Item = &'a str>,
{
    let mut references = Vec::new();
    for source in sources.map(str::trim).filter(|s| !s.is_empty()) {
        if source.starts_with("data:") {
            let url = state.client.upload(source).await?;
            log::info!("[{}] Reference image uploaded to {}", req_id, url);
            references.push(url);
        } else if source.starts_with("blob:") {
            log::warn!("[{}] Skipping blob URL (not reachable by provider): {}", req_id, source);
        } else {
            references.push(source.to_string());
        }
    }
    Ok(references)
}

async fn generate_images(
    state: &AppState,
    req_id: &str,
    prompt: String,
    references: Vec<String>,
) -> Result<CanonicalResult> {
    let model = &state.config.replicate.image_model;
    let raw = state
        .client
        .run(model, &PredictionInput::image(prompt, references))
        .await?;

    let images = normalize(&raw);
    if images.is_empty() {
        log::error!("[{}] No usable images in output: {}", req_id, raw.to_json());
        return Err(GenError::EmptyOutput("No image URLs returned from model".into()));
    }

    log::info!("[{}] Model returned {} image(s)", req_id, images.len());
    Ok(images)
}

fn images_response(images: CanonicalResult) -> HttpResponse {
    HttpResponse::Ok().json(ImagesResponse {
        images: images.into_urls(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Config, ReplicateConfig},
        models::RawValue,
        replicate::GenerationClient,
        server::{configure, json_config},
    };
    use actix_web::{http::StatusCode, test, App};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    struct StubClient {
        output: Result<RawValue>,
        runs: Mutex<Vec<(String, PredictionInput)>>,
        uploads: Mutex<Vec<String>>,
    }

    impl StubClient {
        fn returning(output: Value) -> Arc<Self> {
            Self::with(Ok(RawValue::from(output)))
        }

        fn with(output: Result<RawValue>) -> Arc<Self> {
            Arc::new(Self {
                output,
                runs: Mutex::new(Vec::new()),
                uploads: Mutex::new(Vec::new()),
            })
        }

        fn runs(&self) -> Vec<(String, PredictionInput)> {
            self.runs.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerationClient for StubClient {
        async fn run(&self, model: &str, input: &PredictionInput) -> Result<RawValue> {
            self.runs
                .lock()
                .unwrap()
                .push((model.to_string(), input.clone()));
            match &self.output {
                Ok(raw) => Ok(raw.clone()),
                Err(e) => Err(GenError::ProviderError(e.to_string())),
            }
        }

        async fn upload(&self, data_uri: &str) -> Result<String> {
            let mut uploads = self.uploads.lock().unwrap();
            uploads.push(data_uri.to_string());
            Ok(format!("https://files.test/{}", uploads.len()))
        }
    }

    fn configured() -> Config {
        Config::new().with_replicate(
            ReplicateConfig::new()
                .with_token("r8_test")
                .with_llm_model("meta/meta-llama-3-8b-instruct"),
        )
    }

    async fn send(stub: &Arc<StubClient>, config: Config, req: test::TestRequest) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(config, stub.clone())))
                .app_data(json_config(1024 * 1024))
                .configure(configure),
        )
        .await;
        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    fn post(uri: &str, body: Value) -> test::TestRequest {
        test::TestRequest::post().uri(uri).set_json(body)
    }

    #[actix_web::test]
    async fn test_generate_returns_images() {
        let stub = StubClient::returning(json!(["https://cdn/cat.png"]));
        let (status, body) = send(&stub, configured(), post("/api/generate", json!({ "prompt": "a cat" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "images": ["https://cdn/cat.png"] }));

        let runs = stub.runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].0, "google/nano-banana");
        assert_eq!(runs[0].1.prompt, "a cat");
        assert!(runs[0].1.image_input.is_empty());
    }

    #[actix_web::test]
    async fn test_generate_empty_output_is_an_error() {
        let stub = StubClient::returning(json!({}));
        let (status, body) = send(&stub, configured(), post("/api/generate", json!({ "prompt": "a cat" }))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Generation failed");
        assert_eq!(body["detail"], "No image URLs returned from model");
    }

    #[actix_web::test]
    async fn test_generate_accessor_output() {
        let stub = StubClient::with(Ok(RawValue::record([(
            "url",
            RawValue::accessor(|| "https://cdn/legacy.png".to_string()),
        )])));
        let (status, body) = send(&stub, configured(), post("/api/generate", json!({ "prompt": "a cat" }))).await;

        // A bare record with `url` is not under a priority key, so nothing is found.
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Generation failed");

        let stub = StubClient::with(Ok(RawValue::record([(
            "output",
            RawValue::record([("url", RawValue::accessor(|| "https://cdn/legacy.png".to_string()))]),
        )])));
        let (status, body) = send(&stub, configured(), post("/api/generate", json!({ "prompt": "a cat" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "images": ["https://cdn/legacy.png"] }));
    }

    #[actix_web::test]
    async fn test_generate_rejects_blank_prompt() {
        let stub = StubClient::returning(json!(["https://cdn/cat.png"]));
        let (status, body) = send(&stub, configured(), post("/api/generate", json!({ "prompt": "   " }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid input");
        assert!(stub.runs().is_empty());
    }

    #[actix_web::test]
    async fn test_generate_requires_token() {
        let stub = StubClient::returning(json!(["https://cdn/cat.png"]));
        let (status, body) = send(&stub, Config::new(), post("/api/generate", json!({ "prompt": "a cat" }))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Server configuration error");
        assert!(stub.runs().is_empty());
    }

    #[actix_web::test]
    async fn test_generate_prepares_references() {
        let stub = StubClient::returning(json!("https://cdn/out.png"));
        let (status, _) = send(
            &stub,
            configured(),
            post(
                "/api/generate",
                json!({
                    "prompt": "a cat",
                    "aspectRatio": "16:9",
                    "historyImage": "https://cdn/previous.png",
                    "imageBase64": "data:image/png;base64,iVBORw0KGgo=",
                    "attachedImages": [
                        "blob:http://localhost/abc",
                        "https://cdn/ref.png",
                        "data:image/jpeg;base64,/9j/4AAQ"
                    ]
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let runs = stub.runs();
        assert_eq!(runs[0].1.prompt, "a cat\n(aspect ratio: 16:9)");
        assert_eq!(
            runs[0].1.image_input,
            vec![
                "https://cdn/previous.png",
                "https://files.test/1",
                "https://cdn/ref.png",
                "https://files.test/2",
            ]
        );
        assert_eq!(stub.uploads.lock().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_generate_provider_failure() {
        let stub = StubClient::with(Err(GenError::ProviderError("boom".into())));
        let (status, body) = send(&stub, configured(), post("/api/generate", json!({ "prompt": "a cat" }))).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["detail"], "Provider error: boom");
    }

    #[actix_web::test]
    async fn test_generate_malformed_body() {
        let stub = StubClient::returning(json!([]));
        let req = test::TestRequest::post()
            .uri("/api/generate")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json");
        let (status, body) = send(&stub, configured(), req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid input");
    }

    #[actix_web::test]
    async fn test_generate_rejects_get() {
        let stub = StubClient::returning(json!([]));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(configured(), stub.clone())))
                .configure(configure),
        )
        .await;
        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/generate").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[actix_web::test]
    async fn test_portrait_styles() {
        let stub = StubClient::returning(json!({ "images": ["https://cdn/p.png"] }));
        let (status, body) = send(
            &stub,
            configured(),
            post(
                "/api/portrait",
                json!({ "style": "Studio", "prompt": "  with a  red scarf ", "imageBase64": "https://cdn/me.png" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "images": ["https://cdn/p.png"] }));
        let runs = stub.runs();
        let prompt = &runs[0].1.prompt;
        assert!(prompt.starts_with("A meticulously crafted studio portrait of the subject"));
        assert!(!prompt.contains('\n'));
        assert!(prompt.contains("profound shadows. The composition is an upper-body shot"));
        assert!(prompt.contains(" with a red scarf "));
        assert!(prompt.ends_with(REFERENCE_IDENTITY_HINT));
        assert_eq!(runs[0].1.image_input, vec!["https://cdn/me.png"]);

        let (status, body) = send(&stub, configured(), post("/api/portrait", json!({ "style": "Cubist" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["detail"],
            "Style must be one of: Mono, Studio, Faceless, Urban, Vintage, Indoor, Film, Business"
        );
    }

    #[actix_web::test]
    async fn test_avatar_uses_lowercase_ids() {
        let stub = StubClient::returning(json!(["https://cdn/a.png"]));
        let (status, body) = send(&stub, configured(), post("/api/avatar/generate", json!({ "styleId": "mono" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "images": ["https://cdn/a.png"] }));
        let runs = stub.runs();
        assert!(!runs[0].1.prompt.contains(REFERENCE_IDENTITY_HINT));
        assert!(runs[0].1.image_input.is_empty());

        let (status, body) = send(&stub, configured(), post("/api/avatar/generate", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "invalid styleId");
    }

    #[actix_web::test]
    async fn test_polish_with_llm() {
        let stub = StubClient::returning(json!(["\"A misty", " forest at dawn\""]));
        let (status, body) = send(&stub, configured(), post("/api/polish", json!({ "prompt": "forest   morning" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "prompt": "A misty forest at dawn" }));
        let runs = stub.runs();
        assert_eq!(runs[0].0, "meta/meta-llama-3-8b-instruct");
        assert_eq!(runs[0].1.max_tokens, Some(200));
        assert!(runs[0].1.prompt.contains("User prompt:\nforest   morning"));
    }

    #[actix_web::test]
    async fn test_polish_falls_back_locally() {
        let stub = StubClient::returning(json!("unused"));
        let config = Config::new().with_replicate(ReplicateConfig::new().with_token("r8_test"));
        let (status, body) = send(&stub, config, post("/api/polish", json!({ "prompt": "  forest \n morning " }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "prompt": "forest morning" }));
        assert!(stub.runs().is_empty());

        let failing = StubClient::with(Err(GenError::ProviderError("down".into())));
        let (status, body) = send(&failing, configured(), post("/api/polish", json!({ "prompt": "forest  morning" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "prompt": "forest morning" }));

        let (status, body) = send(&stub, configured(), post("/api/polish", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "prompt": "" }));
    }

    #[actix_web::test]
    async fn test_chat() {
        let stub = StubClient::returning(json!(["Hello", ", ", "there"]));
        let (status, body) = send(&stub, configured(), post("/api/chat", json!({ "prompt": "hi" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "output": "Hello, there" }));
        assert_eq!(stub.runs()[0].1.max_tokens, Some(1000));

        let empty = StubClient::returning(json!([]));
        let (status, body) = send(&empty, configured(), post("/api/chat", json!({ "prompt": "hi" }))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "Model returned empty response");

        let no_llm = Config::new().with_replicate(ReplicateConfig::new().with_token("r8_test"));
        let (status, body) = send(&stub, no_llm, post("/api/chat", json!({ "prompt": "hi" }))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "REPLICATE_LLM_MODEL not configured");
    }

    #[actix_web::test]
    async fn test_health() {
        let stub = StubClient::returning(json!(null));
        let (status, body) = send(&stub, configured(), test::TestRequest::get().uri("/api/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["hasToken"], true);
        assert_eq!(body["llm"], "meta/meta-llama-3-8b-instruct");
        assert_eq!(body["imageModel"], "google/nano-banana");
    }
}
