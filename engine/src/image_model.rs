use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::json;
use strum::{Display, EnumIter};

pub mod replicate;
pub use replicate::ReplicateImageModel;

pub mod replicate_sync;
pub use replicate_sync::ReplicateSyncModel;

use crate::{Error, ImgModBox, Result};

/// stability-ai/sdxl on Replicate.
const SDXL_VERSION: &str = "39ed52f2a78e934b3ba6e2a89f5b1c712de7dfea535525255b1aa35c5565e08b";

const NEGATIVE_PROMPT: &str = "low quality, blurry, distorted, text, words, letters";

#[derive(
    Debug,
    Clone,
    Copy,
    Display,
    clap::ValueEnum,
    Serialize,
    Deserialize,
    Hash,
    PartialEq,
    Eq,
    EnumIter,
    Default,
)]
pub enum Model {
    /// Submit a prediction and poll it until it is terminal.
    #[default]
    Sdxl,
    /// One call that blocks until the prediction is terminal.
    SdxlBlocking,
}

impl Model {
    pub fn make(&self, key: String) -> ImgModBox {
        match self {
            Model::Sdxl => Box::new(ReplicateImageModel::new(
                *self,
                key,
                SDXL_VERSION.into(),
                sdxl_input,
            )),
            Model::SdxlBlocking => Box::new(ReplicateSyncModel::new(
                *self,
                key,
                SDXL_VERSION.into(),
                sdxl_input,
            )),
        }
    }
}

/// Fixed input object for every panel: same negative prompt, same square
/// output size, only the prompt varies.
fn sdxl_input(prompt: &str) -> serde_json::Value {
    json!({
        "prompt": prompt,
        "negative_prompt": NEGATIVE_PROMPT,
        "width": 768,
        "height": 768,
    })
}

pub trait ImageModel {
    /// Resolves to the URL of the generated image. The bytes stay with the
    /// service; callers hand the reference straight to the browser.
    fn get_image<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

    fn clone(&self) -> Box<dyn ImageModel + Send + Sync + 'static>;
    fn model(&self) -> Model;
}

/// Shape shared by both invocation modes.
#[derive(Debug, Deserialize)]
pub(crate) struct PredictionResponse {
    pub status: String,
    pub output: Option<Vec<String>>,
}

/// Non-JSON bodies classify as `Parse`, structurally wrong ones as
/// `InvalidResponse`.
pub(crate) fn parse_prediction(body: &str) -> Result<PredictionResponse> {
    let value = serde_json::from_str::<serde_json::Value>(body).map_err(|e| Error::Parse {
        service: "Replicate",
        message: e.to_string(),
    })?;

    serde_json::from_value(value)
        .map_err(|e| Error::InvalidResponse(format!("Unexpected prediction shape: {e}")))
}

/// A finished prediction must carry a non-empty output list whose first
/// element is the image URL.
pub(crate) fn first_output(output: Option<Vec<String>>) -> Result<String> {
    output
        .and_then(|o| o.into_iter().next())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| Error::InvalidResponse("Prediction finished without an output image".into()))
}

#[cfg(test)]
mod test {
    use expect_test::expect;

    use super::*;

    #[test]
    fn sdxl_input_shape() {
        let expect = expect![[
            r#"{"height":768,"negative_prompt":"low quality, blurry, distorted, text, words, letters","prompt":"a robot painting a sunset","width":768}"#
        ]];
        expect.assert_eq(&sdxl_input("a robot painting a sunset").to_string());
    }

    #[test]
    fn first_output_takes_first_url() {
        let url = first_output(Some(vec!["https://img/0.png".into(), "https://img/1.png".into()]))
            .unwrap();
        assert_eq!(url, "https://img/0.png");
    }

    #[test]
    fn parse_prediction_classifies_failures() {
        assert!(matches!(
            parse_prediction("<html>"),
            Err(Error::Parse { .. })
        ));
        assert!(matches!(
            parse_prediction(r#"{"status": "succeeded", "output": "not a list"}"#),
            Err(Error::InvalidResponse(_))
        ));

        let ok = parse_prediction(r#"{"status": "processing"}"#).unwrap();
        assert_eq!(ok.status, "processing");
        assert!(ok.output.is_none());
    }

    #[test]
    fn first_output_rejects_missing_or_empty() {
        assert!(matches!(first_output(None), Err(Error::InvalidResponse(_))));
        assert!(matches!(
            first_output(Some(vec![])),
            Err(Error::InvalidResponse(_))
        ));
        assert!(matches!(
            first_output(Some(vec!["".into()])),
            Err(Error::InvalidResponse(_))
        ));
    }
}
