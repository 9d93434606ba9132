
mod handlers {
    mod attendance_test;
    mod middleware_test;
    mod public_test;
    mod schedule_test;
}
