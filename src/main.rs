fn main() -> std::io::Result<()> {
    ainotepad::run()
}
