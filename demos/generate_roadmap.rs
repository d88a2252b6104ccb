use std::env;

use gigachat_roadmap::prompt::strip_code_fences;
use gigachat_roadmap::{generate_roadmap_with, GigaChat, RoadmapPrompt, RoadmapStore, Settings};
use tracing_subscriber::EnvFilter;

// Usage: GIGACHAT_CREDENTIALS=... cargo run --example generate-roadmap -- <name> <topic> [refinement]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = env::args().skip(1);
    let (Some(name), Some(topic)) = (args.next(), args.next()) else {
        eprintln!("usage: generate-roadmap <name> <topic> [refinement]");
        std::process::exit(2);
    };
    let refinement = args.next().unwrap_or_default();

    let settings = Settings::from_environment()?;
    let prompt = RoadmapPrompt::new(&topic, &refinement).render();

    let html = generate_roadmap_with(GigaChat::new(settings)?, &prompt)?;

    let store = RoadmapStore::open("roadmaps")?;
    let roadmap = store.save_html(&name, &topic, strip_code_fences(&html))?;
    println!("{}", roadmap.file_path.display());

    Ok(())
}
