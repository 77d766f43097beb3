use clap::Parser;
use color_eyre::Result;
use engine::image_model::Model;

#[derive(clap::Parser)]
struct Arg {
    model: Model,
    key: String,
    prompt: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    color_eyre::install()?;
    let Arg { model, key, prompt } = Arg::parse();
    let imgmod = model.make(key);

    let url = imgmod.get_image(&prompt).await?;
    println!("{url}");

    Ok(())
}
