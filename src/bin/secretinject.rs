fn main() -> color_eyre::eyre::Result<()> {
    secretinject::cli::main()
}
