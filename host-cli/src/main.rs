//! FOV Engine - Host (命令行前端)
//!
//! 无渲染的演示宿主：内置一个两关的小关卡库，用固定的输入序列
//! 驱动 fov-runtime，把每帧产生的指令打印到终端。
//! 用来人工检查运行时的指令流，不是正式前端。

use anyhow::{Context, Result};
use tracing::info;

use fov_runtime::{
    Command, FrameRange, GameRuntime, InteractionElement, LevelLibrary, RuntimeInput,
};

/// 内置演示关卡库
const DEMO_LEVELS: &str = r#"[
    {
        "name": "Chapter1",
        "initial_frame_set": "hallway",
        "frame_sets": [
            { "name": "hallway", "frames": ["hall_00", "hall_01", "hall_02", "hall_03", "hall_04", "hall_05"] },
            { "name": "interior", "frames": ["room_00", "room_01", "room_02"] }
        ],
        "background_music": "bgm_rain",
        "frame_events": [
            {
                "frame_index": 3,
                "frame_set": "hallway",
                "action": { "PlaySound": { "id": "floor_creak" } },
                "trigger_once": true
            }
        ],
        "buttons": [
            {
                "id": "door1",
                "frame_set": "hallway",
                "action": { "SwitchFrameSet": { "target": "interior", "preserve_index": false } }
            },
            {
                "id": "note",
                "frame_set": "interior",
                "action": {
                    "PlayNarration": {
                        "line": { "text": "The handwriting is not yours." }
                    }
                }
            },
            {
                "id": "exit",
                "action": { "TransitionToLevel": { "target": "Chapter2" } }
            }
        ]
    },
    {
        "name": "Chapter2",
        "initial_frame_set": "cellar",
        "frame_sets": [
            { "name": "cellar", "frames": ["cellar_00", "cellar_01"] }
        ],
        "background_music": "bgm_rain"
    }
]"#;

/// 固定的演示输入序列（None 表示空帧）
fn demo_inputs() -> Vec<Option<RuntimeInput>> {
    let mut inputs = vec![
        None,
        Some(RuntimeInput::drag(40.0, 0.0)),
        Some(RuntimeInput::drag(40.0, 0.0)),
        Some(RuntimeInput::activate("door1")),
        Some(RuntimeInput::activate("note")),
    ];
    // 打字机显示期间的空帧
    inputs.extend(std::iter::repeat_with(|| None).take(30));
    inputs.push(Some(RuntimeInput::click())); // 快进
    inputs.push(Some(RuntimeInput::click())); // 关闭旁白
    inputs.push(Some(RuntimeInput::activate("exit")));
    // 过渡淡出/淡入期间的空帧
    inputs.extend(std::iter::repeat_with(|| None).take(90));
    inputs
}

fn print_command(frame: usize, cmd: &Command) {
    println!("  [{frame:03}] {cmd:?}");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let library = LevelLibrary::from_json(DEMO_LEVELS).context("解析内置关卡库失败")?;
    let mut runtime = GameRuntime::new(library);

    // 场景初始化：注册演示场景的交互元素
    runtime.register_element(InteractionElement::new("door1", vec![FrameRange::new(2, 5)]));
    runtime.register_element(InteractionElement::new("note", vec![FrameRange::new(0, 2)]));
    runtime.register_element(InteractionElement::new("exit", vec![]));

    info!("启动演示关卡");
    for cmd in runtime.start("Chapter1").context("开场关卡加载失败")? {
        print_command(0, &cmd);
    }

    // 60 FPS 定步长模拟
    let dt = 1.0 / 60.0;
    for (frame, input) in demo_inputs().into_iter().enumerate() {
        for cmd in runtime.tick(dt, input) {
            print_command(frame + 1, &cmd);
        }
    }

    info!(
        level = runtime.active_level().unwrap_or("<none>"),
        frame = runtime.current_frame_index(),
        "演示结束"
    );
    Ok(())
}
