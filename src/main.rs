fn main() -> anyhow::Result<()> {
    nbody_scope::app::run()
}
