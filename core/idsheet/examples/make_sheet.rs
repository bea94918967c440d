//! Render a print sheet from a portrait that already sits on a plain background.
//!
//! Usage:
//!   cargo run --example make_sheet -- <input> [output.jpg] [options.json]
//!   cargo run --example make_sheet --features rustface -- <input> [output.jpg] [options.json]
//!
//! With the `rustface` feature, the SeetaFace model is read from the path in
//! `IDSHEET_MODEL`. Set `RUST_LOG=idsheet=debug` to see framing decisions.

use std::sync::Arc;

use idsheet::{
    FaceLocator, OpaqueCutout, PhotoPipeline, PipelineConfig, SheetOptions, SheetRequest,
    SheetService,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("idsheet=info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(input_path) = args.get(1) else {
        eprintln!("usage: make_sheet <input> [output.jpg] [options.json]");
        std::process::exit(2);
    };

    let input = std::fs::read(input_path).expect("failed to read input");
    let options: SheetOptions = match args.get(3) {
        Some(path) => {
            let json = std::fs::read_to_string(path).expect("failed to read options");
            serde_json::from_str(&json).expect("invalid options JSON")
        }
        None => SheetOptions::default(),
    };

    let request = SheetRequest::new(input)
        .and_then(|r| r.options(&options))
        .unwrap_or_else(|e| {
            eprintln!("rejected [{}]: {e}", e.code());
            std::process::exit(1);
        });
    let output_path = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| request.file_name());

    let service = SheetService::new(Arc::new(OpaqueCutout))
        .pipeline(PhotoPipeline::new(locator(), PipelineConfig::default()));

    match service.render(request).await {
        Ok(sheet) => {
            std::fs::write(&output_path, &sheet.data).expect("failed to write output");
            println!(
                "{output_path}: photo {}x{}, sheet {}x{} at {} dpi, face {}",
                sheet.photo.width(),
                sheet.photo.height(),
                sheet.sheet.width(),
                sheet.sheet.height(),
                sheet.dpi.value(),
                if sheet.face_bounds.is_some() { "found" } else { "not found" },
            );
        }
        Err(e) => {
            eprintln!("failed [{}]: {e}", e.code());
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "rustface")]
fn locator() -> FaceLocator {
    match std::env::var("IDSHEET_MODEL") {
        Ok(path) => {
            let model = std::fs::read(&path).expect("failed to read model");
            FaceLocator::rustface_cascade(&model).expect("failed to load model")
        }
        Err(_) => FaceLocator::new(),
    }
}

#[cfg(not(feature = "rustface"))]
fn locator() -> FaceLocator {
    FaceLocator::new()
}
