//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责一次表单提交的完整流程，是整个系统的"指挥中心"。
//!
//! ## 流程
//!
//! ```text
//! Start → DorDecision → [Render → Attach] → Dispatch → Done
//!            ↘ 任何步骤失败 → Failure → Done
//! ```
//!
//! ## 层次关系
//!
//! ```text
//! submit_orchestrator (处理一次提交)
//!     ↓
//! services (能力层：resolve / process / render / dispatch)
//!     ↓
//! infrastructure (外部协作方接口)
//! ```
//!
//! ## 设计原则
//!
//! 1. **无共享状态**：每次提交新建结果，组件本身不保存任何提交数据
//! 2. **向下依赖**：编排层 → services → infrastructure
//! 3. **失败收敛**：任何错误（包括 panic）都在这里变成提交结果

pub mod submit_orchestrator;

pub use submit_orchestrator::{Collaborators, SubmitOrchestrator};
