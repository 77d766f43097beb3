use clap::Parser;
use color_eyre::Result;
use engine::{
    comic,
    llm::{LLM as _, OpenAIChat},
};

#[derive(clap::Parser)]
struct Arg {
    api_key: String,
    endpoint: String,
    theme: String,
    #[arg(long, default_value = "gpt-4o")]
    model: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    color_eyre::install()?;
    let Arg {
        api_key,
        endpoint,
        theme,
        model,
    } = Arg::parse();

    let chat = OpenAIChat::new(api_key, endpoint, model);
    let output = chat.send_request(comic::story_request(&theme)).await?;
    let story = comic::parse_story(&output.text)?;

    for (i, panel) in story.panels.iter().enumerate() {
        println!("panel {}:", i + 1);
        println!("  image:   {}", panel.image_prompt);
        println!("  caption: {}", panel.caption);
    }
    println!(
        "tokens: input {}, output {}",
        output.input_tokens, output.output_tokens
    );

    Ok(())
}
