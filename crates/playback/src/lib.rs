//! # Playback
//!
//! 模拟媒体时间轴与脚本会话运行器。
//!
//! - `SimulatedTimeline`: 确定性的虚拟媒体 (时长、加载延迟、时钟偏差、倍速)
//! - `SessionRunner`: 按虚拟时钟推进两路时间轴，执行脚本步骤并驱动同步引擎
//! - `SessionReport`: 会话结束后的统计结果
//!
//! ## 使用示例
//!
//! ```ignore
//! use playback::SessionRunner;
//!
//! let mut runner = SessionRunner::new(&blueprint)?;
//! let report = runner.run_to_end();
//! println!("{}", report.metrics);
//! ```

mod report;
mod runner;
mod timeline;

pub use report::{SessionReport, StepRecord, TimelineSnapshot};
pub use runner::SessionRunner;
pub use timeline::SimulatedTimeline;
