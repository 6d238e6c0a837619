use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use videogen::cli::{Cli, Commands};
use videogen::config::Config;
use videogen::pipeline::{GenerationOptions, GenerationPipeline};
use videogen::planner::{LlmPlanner, PlanSource, ScriptFileSource, TranscriptSource};
use videogen::utils;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "videogen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config::load().await?;

    match cli.command {
        Commands::Generate {
            urls,
            script_file,
            prompt,
            project,
            render,
            upload,
            privacy,
            upload_title,
            upload_description,
        } => {
            if urls.is_empty() && script_file.is_none() {
                anyhow::bail!("Provide at least one YouTube URL or a --script-file");
            }

            if !urls.is_empty() && prompt.is_empty() {
                anyhow::bail!("--prompt is required when using YouTube URLs");
            }

            for url in &urls {
                utils::validate_and_normalize_url(url)?;
            }

            // Check for required external tools (non-fatal, they may still
            // resolve at call time)
            let missing_deps = utils::check_dependencies().await;
            if !missing_deps.is_empty() {
                eprintln!("{} Dependency check warnings:", style("⚠").yellow());
                for dep in missing_deps {
                    eprintln!("   • {}", dep);
                }
                eprintln!("   (Continuing anyway - tools may be available)");
            }

            let (source, brief): (Box<dyn PlanSource>, String) = match script_file {
                Some(path) => {
                    let brief = if prompt.is_empty() {
                        "Video generated from provided script.".to_string()
                    } else {
                        prompt.clone()
                    };
                    (Box::new(ScriptFileSource::new(path)), brief)
                }
                None => {
                    let planner = LlmPlanner::new(&config)?;
                    let source = TranscriptSource::new(
                        urls,
                        prompt.clone(),
                        planner,
                        config.app.caption_languages.clone(),
                    );
                    (Box::new(source), prompt.clone())
                }
            };

            let options = GenerationOptions {
                project_name: project,
                brief,
                render,
                upload,
                privacy,
                upload_title,
                upload_description,
            };

            tracing::info!("Starting generation run for project: {}", options.project_name);

            let pipeline = GenerationPipeline::new(config)?;
            let result = pipeline.run(source.as_ref(), &options).await?;

            println!(
                "Project '{}' prepared with {} segments",
                result.name,
                result.segments.len()
            );
            if render {
                println!("Rendered video: {}", result.render_path.display());
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                println!("Configuration file: {}", Config::path()?.display());
                println!("Edit it to change models, voices, directories and caption languages.");
            }
        }
        Commands::Tools => {
            println!("Required external tools:");
            println!("  • yt-dlp  - YouTube transcript extraction");
            println!("  • ffmpeg  - video rendering");
            println!("  • ffprobe - narration duration probing");
            println!();
            println!("Required environment variables:");
            println!("  • OPENAI_API_KEY       - segment planning and speech synthesis");
            println!("  • PEXELS_API_KEY       - stock footage search");
            println!("  • YOUTUBE_ACCESS_TOKEN - publishing (only with --upload)");
        }
    }

    Ok(())
}
