fn main() {
    subscription_tracker_lib::run()
}
