fn main() -> anyhow::Result<()> {
    labelview::cli::run::entry()
}
