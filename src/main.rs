use anyhow::Result;

fn main() -> Result<()> {
    claude_bushwack::cli::run()
}
