use indoc::{formatdoc, indoc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    Error, ImgModBox, LLMBox, N_PANELS, Result,
    llm::{InputMessage, Request},
};

/// One unit of the comic: what to draw, and the text shown below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    #[serde(rename = "imagePrompt")]
    pub image_prompt: String,
    pub caption: String,
}

/// The fixed three-panel sequence produced for a theme. Only
/// [`parse_story`] constructs one, so a `Story` in hand is always valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub panels: Vec<Panel>,
}

/// Owns the two injected clients and runs the whole pipeline: theme in,
/// story out, then one image per panel.
pub struct Studio {
    llm: LLMBox,
    imgmod: ImgModBox,
}

impl Clone for Studio {
    fn clone(&self) -> Self {
        Self {
            llm: self.llm.clone(),
            imgmod: self.imgmod.clone(),
        }
    }
}

impl Studio {
    pub fn new(llm: LLMBox, imgmod: ImgModBox) -> Self {
        Self { llm, imgmod }
    }

    pub async fn generate_story(&self, theme: &str) -> Result<Story> {
        let output = self.llm.send_request(story_request(theme)).await?;
        debug!("story completion:\n{}", output.text);
        parse_story(&output.text)
    }

    /// Renders every prompt concurrently and joins the results in input
    /// order: `result[i]` belongs to `prompts[i]` no matter which request
    /// finishes first. One failed panel fails the whole call.
    pub async fn render_panels(&self, prompts: &[String]) -> Result<Vec<String>> {
        debug!(
            "rendering {} prompts with {}",
            prompts.len(),
            self.imgmod.model()
        );

        let handles: Vec<_> = prompts
            .iter()
            .map(|prompt| {
                let imgmod = self.imgmod.clone();
                let prompt = prompt.clone();
                tokio::spawn(async move { imgmod.get_image(&prompt).await })
            })
            .collect();

        let mut urls = Vec::with_capacity(handles.len());
        for handle in handles {
            let url = handle
                .await
                .map_err(|e| Error::GenerationFailed(format!("Image task aborted: {e}")))??;
            urls.push(url);
        }

        Ok(urls)
    }
}

pub fn story_request(theme: &str) -> Request {
    let system = indoc! {"
        You are a creative comic book writer who specializes in creating
        engaging 3-panel stories. Focus on visual storytelling and clear,
        concise descriptions.
    "};

    let user = formatdoc! {r#"
        Create a 3-panel comic story about {theme}. For each panel, provide:
        1. A description of what should be in the image
        2. The caption or dialogue for that panel
        Make it engaging and suitable for a comic format.
        Return it in the following JSON format:
        {{
          "panels": [
            {{
              "imagePrompt": "detailed description for image generation",
              "caption": "text that will appear below the panel"
            }}
          ]
        }}
    "#};

    Request {
        system: Some(system.to_string()),
        messages: vec![InputMessage::user(user)],
        max_tokens: 1024,
        json_response: true,
    }
}

pub fn parse_story(content: &str) -> Result<Story> {
    let value = serde_json::from_str::<serde_json::Value>(content).map_err(|e| Error::Parse {
        service: "OpenAI",
        message: e.to_string(),
    })?;

    let story: Story = serde_json::from_value(value)
        .map_err(|e| Error::Schema(format!("Invalid story format: {e}")))?;

    if story.panels.len() != N_PANELS {
        return Err(Error::Schema(format!(
            "Invalid story format: expected {N_PANELS} panels, got {}",
            story.panels.len()
        )));
    }

    for (i, panel) in story.panels.iter().enumerate() {
        if panel.image_prompt.trim().is_empty() || panel.caption.trim().is_empty() {
            return Err(Error::Schema(format!(
                "Invalid panel {}: missing imagePrompt or caption",
                i + 1
            )));
        }
    }

    Ok(story)
}

#[cfg(test)]
mod test {
    use std::{pin::Pin, time::Duration};

    use expect_test::expect;

    use super::*;
    use crate::{
        image_model::{ImageModel, Model},
        llm::{LLM, OutputMessage},
    };

    const ROBOT_STORY: &str = r#"{
        "panels": [
            {"imagePrompt": "a small robot holding a brush in a cluttered studio", "caption": "Day one."},
            {"imagePrompt": "the robot splattered in paint before a ruined canvas", "caption": "This is harder than it looks."},
            {"imagePrompt": "the robot beaming next to a sunset painting", "caption": "Worth every error."}
        ]
    }"#;

    #[derive(Clone)]
    struct CannedLLM(&'static str);

    impl LLM for CannedLLM {
        fn send_request<'a>(
            &'a self,
            _req: Request,
        ) -> Pin<Box<dyn Future<Output = Result<OutputMessage>> + Send + 'a>> {
            let text = self.0.to_string();
            Box::pin(async move {
                Ok(OutputMessage {
                    input_tokens: 0,
                    output_tokens: 0,
                    text,
                })
            })
        }

        fn clone(&self) -> Box<dyn LLM + Send + Sync + 'static> {
            Box::new(Clone::clone(self))
        }
    }

    /// Completes after the millisecond delay encoded before the colon, so
    /// tests can force out-of-order completion. A "fail" delay errors.
    #[derive(Clone)]
    struct StaggeredModel;

    impl ImageModel for StaggeredModel {
        fn get_image<'a>(
            &'a self,
            prompt: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
            Box::pin(async move {
                let (delay, subject) = prompt.split_once(':').unwrap();
                if delay == "fail" {
                    return Err(Error::GenerationFailed("panel refused".into()));
                }
                tokio::time::sleep(Duration::from_millis(delay.parse().unwrap())).await;
                Ok(format!("https://img.invalid/{subject}"))
            })
        }

        fn clone(&self) -> Box<dyn ImageModel + Send + Sync + 'static> {
            Box::new(Clone::clone(self))
        }

        fn model(&self) -> Model {
            Model::Sdxl
        }
    }

    /// Echoes the prompt back as a URL, instantly.
    #[derive(Clone)]
    struct EchoModel;

    impl ImageModel for EchoModel {
        fn get_image<'a>(
            &'a self,
            prompt: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
            let url = format!("https://img.invalid/{prompt}");
            Box::pin(async move { Ok(url) })
        }

        fn clone(&self) -> Box<dyn ImageModel + Send + Sync + 'static> {
            Box::new(Clone::clone(self))
        }

        fn model(&self) -> Model {
            Model::Sdxl
        }
    }

    #[test]
    fn story_request_prompt() {
        let req = story_request("a robot learning to paint");
        assert!(req.json_response);

        let expect = expect![[r#"
            Create a 3-panel comic story about a robot learning to paint. For each panel, provide:
            1. A description of what should be in the image
            2. The caption or dialogue for that panel
            Make it engaging and suitable for a comic format.
            Return it in the following JSON format:
            {
              "panels": [
                {
                  "imagePrompt": "detailed description for image generation",
                  "caption": "text that will appear below the panel"
                }
              ]
            }
        "#]];
        expect.assert_eq(&req.messages[0].content);
    }

    #[test]
    fn parse_story_accepts_three_panels() {
        let story = parse_story(ROBOT_STORY).unwrap();
        assert_eq!(story.panels.len(), 3);
        assert_eq!(story.panels[0].caption, "Day one.");
    }

    #[test]
    fn parse_story_rejects_malformed_json() {
        assert!(matches!(parse_story("not json"), Err(Error::Parse { .. })));
    }

    #[test]
    fn parse_story_rejects_wrong_panel_count() {
        let two_panels = r#"{"panels": [
            {"imagePrompt": "a", "caption": "b"},
            {"imagePrompt": "c", "caption": "d"}
        ]}"#;
        assert!(matches!(parse_story(two_panels), Err(Error::Schema(_))));
    }

    #[test]
    fn parse_story_rejects_missing_caption() {
        let missing = r#"{"panels": [
            {"imagePrompt": "a", "caption": "b"},
            {"imagePrompt": "c", "caption": "d"},
            {"imagePrompt": "e"}
        ]}"#;
        assert!(matches!(parse_story(missing), Err(Error::Schema(_))));
    }

    #[test]
    fn parse_story_rejects_empty_image_prompt() {
        let empty = r#"{"panels": [
            {"imagePrompt": "  ", "caption": "b"},
            {"imagePrompt": "c", "caption": "d"},
            {"imagePrompt": "e", "caption": "f"}
        ]}"#;
        assert!(matches!(parse_story(empty), Err(Error::Schema(_))));
    }

    #[tokio::test]
    async fn render_panels_preserves_input_order() {
        let studio = Studio::new(Box::new(CannedLLM(ROBOT_STORY)), Box::new(StaggeredModel));
        let prompts = vec!["40:slowest".to_string(), "1:fastest".into(), "20:mid".into()];

        let urls = studio.render_panels(&prompts).await.unwrap();

        assert_eq!(
            urls,
            vec![
                "https://img.invalid/slowest",
                "https://img.invalid/fastest",
                "https://img.invalid/mid",
            ]
        );
    }

    #[tokio::test]
    async fn render_panels_fails_as_a_whole() {
        let studio = Studio::new(Box::new(CannedLLM(ROBOT_STORY)), Box::new(StaggeredModel));
        let prompts = vec!["1:ok".to_string(), "fail:broken".into(), "1:fine".into()];

        assert!(matches!(
            studio.render_panels(&prompts).await,
            Err(Error::GenerationFailed(_))
        ));
    }

    #[tokio::test]
    async fn round_trip_robot_theme() {
        let studio = Studio::new(Box::new(CannedLLM(ROBOT_STORY)), Box::new(EchoModel));

        let story = studio.generate_story("a robot learning to paint").await.unwrap();
        assert_eq!(story.panels.len(), 3);

        let prompts: Vec<String> = story.panels.iter().map(|p| p.image_prompt.clone()).collect();
        let urls = studio.render_panels(&prompts).await.unwrap();

        assert_eq!(urls.len(), story.panels.len());
        for (url, panel) in urls.iter().zip(&story.panels) {
            assert_eq!(url, &format!("https://img.invalid/{}", panel.image_prompt));
        }
    }
}
