//! The model itself, for emitters that live outside this crate.

use crate::emit::{Context, Emitter};
use crate::model::Api;

pub struct JsonEmitter;

impl Emitter for JsonEmitter {
    fn emit(&self, api: &Api, _ctx: &Context) -> String {
        // The model only holds strings and vectors, so serializing cannot fail.
        serde_json::to_string_pretty(api).unwrap_or_default() + "\n"
    }

    fn target(&self) -> &str {
        "json"
    }
}
