fn main() -> anyhow::Result<()> {
    ailpak::cli::run_cli()
}
