//! Browser file I/O: reading picked files and saving generated documents.

use js_sys::{Array, Uint8Array};
use log::info;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, File, HtmlAnchorElement, Url};

use crate::error::{ImportError, RenderError};
use crate::project::SourceFile;

/// Reads a picked or dropped file into memory.
pub async fn read_file(file: &File) -> Result<SourceFile, ImportError> {
	let name = file.name();
	let buffer = JsFuture::from(file.array_buffer())
		.await
		.map_err(|e| ImportError::Read {
			file: name.clone(),
			message: RenderError::from(e).to_string(),
		})?;
	let bytes = Uint8Array::new(&buffer).to_vec();
	info!("toile: read {name} ({} bytes)", bytes.len());
	Ok(SourceFile { name, bytes })
}

/// Offers `text` as a download named `filename`.
pub fn save_text(filename: &str, text: &str, mime: &str) -> Result<(), RenderError> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or(RenderError::Dom("document"))?;
	let body = document.body().ok_or(RenderError::Dom("document body"))?;

	let options = BlobPropertyBag::new();
	options.set_type(mime);
	let parts = Array::of1(&JsValue::from_str(text));
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
	let url = Url::create_object_url_with_blob(&blob)?;

	let anchor: HtmlAnchorElement = document
		.create_element("a")?
		.dyn_into()
		.map_err(|_| RenderError::Dom("anchor element"))?;
	anchor.set_href(&url);
	anchor.set_download(filename);
	body.append_child(&anchor)?;
	anchor.click();
	anchor.remove();
	Url::revoke_object_url(&url)?;

	info!("toile: saved {filename} ({} bytes)", text.len());
	Ok(())
}
