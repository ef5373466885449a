fn main() -> anyhow::Result<()> {
    nah_cli::run()
}
