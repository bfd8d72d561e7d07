use clap::Parser;
use client::render::Renderer;
use client::session::Session;
use log::info;
use macroquad::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the score service
    #[arg(short = 's', long, default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Window width
    #[arg(short = 'w', long, default_value = "1280")]
    width: i32,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value = "720")]
    height: i32,
}

fn window_conf() -> Conf {
    let args = Args::parse();
    Conf {
        window_title: "Terminal Breach".to_string(),
        window_width: args.width,
        window_height: args.height,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    info!("Connecting to service at {}", args.server);
    info!("Controls: steer with the pointer, hold click/Space to boost, Esc to abort");

    let mut session = Session::new(&args.server, screen_width(), screen_height());
    let mut renderer = Renderer::new(screen_width(), screen_height());

    loop {
        session.frame();
        renderer.draw(&session);
        next_frame().await;
    }
}
