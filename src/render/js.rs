//! Small `Reflect` helpers for driving JavaScript libraries without bindings.

use js_sys::{Array, Function, Object, Reflect};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};

use crate::error::RenderError;

/// A property of `globalThis`, failing when it is undefined.
pub fn global(name: &str) -> Result<JsValue, RenderError> {
	let value = Reflect::get(&js_sys::global(), &JsValue::from_str(name))?;
	if value.is_undefined() {
		return Err(RenderError::MissingGlobal(name.to_string()));
	}
	Ok(value)
}

/// Walks `keys` from `root`, failing on the first undefined step.
pub fn path(root: &JsValue, keys: &[&str]) -> Result<JsValue, RenderError> {
	let mut current = root.clone();
	for (i, key) in keys.iter().enumerate() {
		current = Reflect::get(&current, &JsValue::from_str(key))?;
		if current.is_undefined() {
			return Err(RenderError::MissingGlobal(keys[..=i].join(".")));
		}
	}
	Ok(current)
}

pub fn get(target: &JsValue, key: &str) -> Result<JsValue, RenderError> {
	Ok(Reflect::get(target, &JsValue::from_str(key))?)
}

pub fn set(target: &JsValue, key: &str, value: &JsValue) -> Result<(), RenderError> {
	Reflect::set(target, &JsValue::from_str(key), value)?;
	Ok(())
}

fn as_function(value: JsValue, name: &str) -> Result<Function, RenderError> {
	value
		.dyn_into::<Function>()
		.map_err(|_| RenderError::Js(format!("{name} is not a function")))
}

/// Calls `target[method](...args)`.
pub fn call(target: &JsValue, method: &str, args: &[JsValue]) -> Result<JsValue, RenderError> {
	let function = as_function(get(target, method)?, method)?;
	Ok(function.apply(target, &args.iter().collect::<Array>())?)
}

/// `new class(...args)`.
pub fn construct(class: &JsValue, args: &[JsValue]) -> Result<JsValue, RenderError> {
	let constructor = as_function(class.clone(), "constructor")?;
	Ok(Reflect::construct(&constructor, &args.iter().collect::<Array>())?)
}

/// Converts a serializable payload into a plain JavaScript object graph.
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, RenderError> {
	let text = serde_json::to_string(value).map_err(|e| RenderError::Js(e.to_string()))?;
	Ok(js_sys::JSON::parse(&text)?)
}

/// A fresh `{}`.
pub fn object() -> JsValue {
	Object::new().into()
}
