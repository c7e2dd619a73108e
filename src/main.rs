//! flat_obj_viewer - 平面着色 OBJ 查看器
//!
//! 加载一个 OBJ 模型，绕 Y 轴旋转并以平面着色绘制。
//!
//! # 使用方法
//!
//! ```bash
//! # 使用配置文件中的模型
//! cargo run
//!
//! # 指定模型并覆盖窗口尺寸
//! cargo run -- data/cube.obj --width 800 --height 600
//!
//! # 只加载并打印绘制统计，不打开窗口
//! cargo run -- data/cube.obj --dump
//! ```
//!
//! # 按键
//!
//! - `w`：切换线框模式（同时切换光照）
//! - `Esc`：退出

use std::path::Path;
use std::time::Instant;

use flat_obj_viewer::app::{map_key_event, AppAction, AppState};
use flat_obj_viewer::core::{log, Config};
use flat_obj_viewer::geometry::loaders::{load_mesh_with, LoadReport, LoaderOptions};
use flat_obj_viewer::geometry::Mesh;
use flat_obj_viewer::gfx::Renderer;
use flat_obj_viewer::renderer::{draw_mesh, CommandRecorder, DrawOptions};
use tracing::{debug, error, info};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};

/// 应用程序入口点
///
/// # 初始化流程
///
/// 1. 加载配置文件（config.toml）
/// 2. 应用命令行参数覆盖
/// 3. 初始化日志系统
/// 4. 加载模型
/// 5. 创建事件循环和渲染器
/// 6. 启动主循环
///
/// # 命令行参数
///
/// - `<path>`: 模型文件路径
/// - `--width <value>` / `--height <value>`: 窗口尺寸
/// - `--strict`: 无法解析的数值直接报错
/// - `--validate`: 加载后检查所有面的索引
/// - `--legacy-normals`: 使用旧版 (x, z, z) 法线顺序
/// - `--dump`: 打印绘制统计后退出
fn main() {
    // 1. 加载配置（在初始化日志之前）
    let mut config = Config::from_file_or_default("config.toml");

    // 2. 应用命令行参数
    config.apply_args(std::env::args());
    let dump = std::env::args().skip(1).any(|arg| arg == "--dump");

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    // 3. 初始化日志系统
    let log_file = if config.logging.file_output {
        Some(config.logging.log_file.as_str())
    } else {
        None
    };
    log::init_logger(config.logging.level, config.logging.file_output, log_file);
    info!(version = env!("CARGO_PKG_VERSION"), "flat_obj_viewer starting...");

    // 4. 加载模型
    let options = LoaderOptions::from_config(&config.loader);
    let model_path = config.scene.model_path.clone();
    let (mesh, report) = match load_mesh_with(Path::new(&model_path), &options) {
        Ok(loaded) => loaded,
        Err(e) => {
            flat_obj_viewer::viewer_error!(path = %model_path, "Failed to load model: {}", e);
            eprintln!("[!] ERROR: {}", e);
            std::process::exit(1);
        }
    };

    if dump {
        print_summary(&mesh, &report, &DrawOptions::from_config(&config.loader));
        return;
    }

    // 5. 创建事件循环和渲染器
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!("Failed to create event loop: {}", e);
            eprintln!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };

    let mut renderer = match Renderer::new(&event_loop, &config) {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to initialize renderer: {}", e);
            eprintln!("Failed to initialize renderer: {}", e);
            std::process::exit(1);
        }
    };

    let mut state = AppState::new(&config);
    let size = renderer.window().inner_size();
    state.resize(size.width, size.height);

    info!("Entering main loop...");

    // 6. 启动事件循环
    let mut next_tick = Instant::now() + state.frame_interval();
    let result = event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    info!("Close requested, shutting down...");
                    elwt.exit();
                }
                WindowEvent::Resized(new_size) => {
                    debug!(width = new_size.width, height = new_size.height, "Window resized");
                    state.resize(new_size.width, new_size.height);
                    renderer.resize(new_size.width, new_size.height);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if let Some(key) = map_key_event(&event) {
                        match state.handle_key(key) {
                            AppAction::Exit => {
                                info!("Escape pressed, shutting down...");
                                elwt.exit();
                            }
                            AppAction::Redraw => renderer.window().request_redraw(),
                            AppAction::None => {}
                        }
                    }
                }
                WindowEvent::RedrawRequested => {
                    if let Err(e) = renderer.draw(&mesh, &state) {
                        error!("Draw failed: {}", e);
                        eprintln!("Draw failed: {}", e);
                        elwt.exit();
                    }
                }
                _ => (),
            },
            // 定时推进旋转动画
            Event::AboutToWait => {
                let now = Instant::now();
                if now >= next_tick {
                    state.tick();
                    renderer.window().request_redraw();
                    next_tick = now + state.frame_interval();
                }
                elwt.set_control_flow(ControlFlow::WaitUntil(next_tick));
            }
            _ => (),
        }
    });

    if let Err(e) = result {
        error!("Event loop terminated with error: {}", e);
        std::process::exit(1);
    }
}

/// 把网格绘制到命令记录器并打印统计
fn print_summary(mesh: &Mesh, report: &LoadReport, options: &DrawOptions) {
    let mut recorder = CommandRecorder::new();
    let stats = draw_mesh(mesh, &mut recorder, options);

    println!("model:     {}", mesh.name.as_deref().unwrap_or("<unnamed>"));
    println!("lines:     {}", report.lines);
    println!("points:    {}", mesh.point_count());
    println!("faces:     {}", mesh.face_count());
    println!("ignored:   {}", report.ignored_lines);
    println!("coerced:   {}", report.coerced_tokens);
    println!("triangles: {}", stats.triangles);
    println!(
        "skipped:   {} short, {} out of range",
        stats.skipped_short, stats.skipped_out_of_range
    );
    println!("truncated: {}", stats.truncated);
    println!("degenerate: {}", stats.degenerate);

    if let Some((min, max)) = mesh.bounds() {
        println!(
            "bounds:    ({}, {}, {}) .. ({}, {}, {})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    for defect in mesh.defects() {
        println!("defect:    {}", defect);
    }
}
