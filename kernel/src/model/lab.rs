use strum::{AsRefStr, EnumString, IntoStaticStr};

// 物理的なラボの区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Lab {
    Ive,
    Cezeri,
    Medtech,
}
