//! Shared UI icons.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[FAIL]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "*");

// Sweep indicators
pub static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
pub static FILE_NEW: Emoji<'_, '_> = Emoji("📄 ", "+");
pub static SKIP: Emoji<'_, '_> = Emoji("🚧 ", "[SKIP]");
pub static CLOCK: Emoji<'_, '_> = Emoji("⏱️  ", "[T]");
pub static PROGRESS: Emoji<'_, '_> = Emoji("📊 ", "[PROG]");
