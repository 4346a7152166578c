/// Recognize a digit in an image file from the command line.
///
/// Run with:
///   cargo run --example recognize -- models/mnist.json drawing.png
///
/// The image can be any size; it goes through the same downsample →
/// normalize → infer → softmax pipeline as the server.

use std::path::Path;
use std::process::ExitCode;

use ferrite_digits::{InferenceSession, RasterFrame, Recognizer};

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_target(false).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("usage: {} <model.json|model.onnx> <image>", args[0]);
        return ExitCode::FAILURE;
    }

    let bytes = match std::fs::read(&args[2]) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("cannot read {}: {}", args[2], e);
            return ExitCode::FAILURE;
        }
    };

    let result = RasterFrame::decode(&bytes).and_then(|frame| {
        let session = InferenceSession::load(Path::new(&args[1]))?;
        Recognizer::new(&session).classify_raster(&frame)
    });

    match result {
        Ok(c) => {
            println!("digit: {}  (confidence {:.1}%)", c.prediction.digit, c.prediction.confidence * 100.0);
            for (digit, p) in c.probabilities.iter().enumerate() {
                let bar = "#".repeat((p * 40.0).round() as usize);
                println!("  {} {:>6.2}% {}", digit, p * 100.0, bar);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("[{}] {}", e.kind(), e);
            ExitCode::FAILURE
        }
    }
}
