//! On-demand loading of renderer scripts.
//!
//! Each URL is injected once per page; concurrent and later requests for the
//! same URL await the same promise. A failed load is forgotten so the next
//! attempt retries it.

use std::cell::RefCell;
use std::collections::HashMap;

use js_sys::{Function, Promise};
use log::{debug, error};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlScriptElement;

use crate::error::RenderError;

thread_local! {
	static LOADS: RefCell<HashMap<String, Promise>> = RefCell::new(HashMap::new());
}

fn script_promise(url: &str) -> Result<Promise, RenderError> {
	if let Some(promise) = LOADS.with(|loads| loads.borrow().get(url).cloned()) {
		return Ok(promise);
	}

	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or(RenderError::Dom("document"))?;
	let head = document.head().ok_or(RenderError::Dom("document head"))?;
	let script: HtmlScriptElement = document
		.create_element("script")?
		.dyn_into()
		.map_err(|_| RenderError::Dom("script element"))?;
	script.set_src(url);

	let promise = Promise::new(&mut |resolve: Function, reject: Function| {
		script.set_onload(Some(&resolve));
		script.set_onerror(Some(&reject));
	});
	head.append_child(&script)?;
	debug!("toile: loading script {url}");

	LOADS.with(|loads| loads.borrow_mut().insert(url.to_string(), promise.clone()));
	Ok(promise)
}

/// Loads `urls` one after another, so later scripts may depend on earlier ones.
pub async fn load_scripts(urls: &[String]) -> Result<(), RenderError> {
	for url in urls {
		let promise = script_promise(url)?;
		if JsFuture::from(promise).await.is_err() {
			error!("toile: script {url} failed to load");
			LOADS.with(|loads| loads.borrow_mut().remove(url));
			return Err(RenderError::ScriptLoad(url.clone()));
		}
	}
	Ok(())
}
