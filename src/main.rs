fn main() -> anyhow::Result<()> {
    zoom_kiosk_lib::run()
}
