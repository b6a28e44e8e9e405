//! services/api/src/bin/openapi.rs
//!
//! Dumps the OpenAPI document of the quiz service (`/quizzes`, the two export
//! routes and `/health`) so clients can be generated without starting the server.
//!
//! Usage: `openapi [PATH]`. Writes to `openapi.json` by default; `-` prints to stdout.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    let document = ApiDoc::openapi().to_pretty_json()?;

    if output == "-" {
        println!("{}", document);
    } else {
        std::fs::write(&output, document)?;
        eprintln!("Quiz API document written to {}", output);
    }
    Ok(())
}
