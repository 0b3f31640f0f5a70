//! Header parser. Builds the shared model from the header text.

pub mod constants;
pub mod doc;
pub mod functions;
pub mod lexer;

use tracing::debug;

use crate::model::Api;
use crate::profile::Profile;

/// Parse a whole header into the model every emitter consumes.
pub fn parse_header(header: &str, profile: &Profile) -> Api {
    let api = Api {
        constants: constants::extract(header, profile),
        functions: functions::extract(header, profile),
    };
    debug!(
        "parsed {} bytes: {} constants, {} functions",
        header.len(),
        api.constants.len(),
        api.functions.len()
    );
    api
}
