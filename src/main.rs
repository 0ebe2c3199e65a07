fn main() -> anyhow::Result<()> {
    agata_retail_lib::run()
}
