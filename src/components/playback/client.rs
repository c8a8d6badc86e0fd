//! HTTP client for the algorithm service, over the browser's `fetch`.

use log::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

use super::api::{self, RunCreated, RunRequest, StepHighlight};
use crate::error::TransportError;

#[derive(Clone, Debug)]
pub struct AlgorithmClient {
	base_url: String,
}

impl AlgorithmClient {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
		}
	}

	/// `POST /api/algorithms/run`
	pub async fn create_run(&self, request: &RunRequest) -> Result<RunCreated, TransportError> {
		let body = serde_json::to_string(request)?;
		let url = api::run_path(&self.base_url);
		debug!("POST {url}");
		let text = self.send("POST", &url, Some(&body)).await?;
		Ok(serde_json::from_str(&text)?)
	}

	/// `GET /api/algorithms/run/{run_id}/step/{index}`
	pub async fn fetch_step(&self, run_id: &str, index: usize) -> Result<StepHighlight, TransportError> {
		let url = api::step_path(&self.base_url, run_id, index);
		debug!("GET {url}");
		let text = self.send("GET", &url, None).await?;
		Ok(serde_json::from_str(&text)?)
	}

	async fn send(&self, method: &str, url: &str, body: Option<&str>) -> Result<String, TransportError> {
		let headers = Headers::new().map_err(js_error)?;
		headers.set("Accept", "application/json").map_err(js_error)?;
		if body.is_some() {
			headers.set("Content-Type", "application/json").map_err(js_error)?;
		}
		let opts = RequestInit::new();
		opts.set_method(method);
		opts.set_headers(&headers.into());
		opts.set_mode(RequestMode::Cors);
		if let Some(body) = body {
			opts.set_body(&JsValue::from_str(body));
		}
		let request = Request::new_with_str_and_init(url, &opts).map_err(js_error)?;

		let window = web_sys::window().ok_or_else(|| TransportError::Request("no window".into()))?;
		let resp_val = JsFuture::from(window.fetch_with_request(&request))
			.await
			.map_err(js_error)?;
		let resp: Response = resp_val
			.dyn_into()
			.map_err(|_| TransportError::Request("not a Response".into()))?;

		if !resp.ok() {
			let status = resp.status();
			let body = read_text(&resp).await.unwrap_or_default();
			return Err(TransportError::Status { status, body });
		}
		read_text(&resp).await
	}
}

async fn read_text(resp: &Response) -> Result<String, TransportError> {
	let text = JsFuture::from(resp.text().map_err(js_error)?)
		.await
		.map_err(js_error)?;
	text.as_string()
		.ok_or_else(|| TransportError::Decode("response body is not text".into()))
}

fn js_error(err: JsValue) -> TransportError {
	TransportError::Request(
		err.as_string()
			.unwrap_or_else(|| format!("{err:?}")),
	)
}
