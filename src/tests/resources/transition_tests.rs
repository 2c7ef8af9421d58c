use super::support::*;
use crate::{CommandSet, PowerManager, PowerState, VirtualPowerManager};

fn running(commands: &CommandSet, stdout: &str) -> Step {
    step(commands, commands.list_running_cmd, TEST_NODE, ok(stdout))
}

/// Lookup followed by the running list: what one power query sends.
fn query_steps(commands: &CommandSet, running_list: &str) -> Vec<Step> {
    let mut steps = locate_steps(commands);
    steps.push(running(commands, running_list));
    steps
}

#[tokio::test]
async fn test_activate_node() {
    let commands = vbox();
    let mut script = locate_steps(&commands);
    script.push(step(&commands, commands.start_cmd, TEST_TARGET, ok("Started")));
    script.extend(query_steps(&commands, "\"testNode\""));
    let mut pm = create_pm(script);

    let state = pm.activate_node().await;
    assert_eq!(state, PowerState::Active);
    assert_eq!(state.to_string(), "active");
    assert_eq!(pm.state(), Some(PowerState::Active));
}

#[tokio::test]
async fn test_activate_node_fail() {
    let commands = vbox();
    let mut script = locate_steps(&commands);
    script.push(step(&commands, commands.start_cmd, TEST_TARGET, ok("Started")));
    script.extend(query_steps(&commands, ""));
    let mut pm = create_pm(script);

    assert_eq!(pm.activate_node().await, PowerState::Error);
    assert_eq!(pm.state(), Some(PowerState::Error));
}

#[tokio::test]
async fn test_activate_node_with_exception() {
    let commands = vbox();
    let mut script = locate_steps(&commands);
    script.push(step(
        &commands,
        commands.start_cmd,
        TEST_TARGET,
        failed("startvm \"testNode\""),
    ));
    // The transition stops at the failed start; no power query follows.
    let mut pm = create_pm(script);

    assert_eq!(pm.activate_node().await, PowerState::Error);
}

#[tokio::test]
async fn test_activate_node_not_found() {
    let commands = vbox();
    let mut pm = create_pm(vec![
        step(&commands, commands.list_cmd, "", ok("testNode")),
        step(&commands, commands.get_node_macs, TEST_TARGET, ok("ffeeddccbbaa")),
    ]);

    assert_eq!(pm.activate_node().await, PowerState::Error);
}

#[tokio::test]
async fn test_deactivate_node() {
    let commands = vbox();
    let mut script = query_steps(&commands, "\"testNode\"");
    script.push(step(&commands, commands.stop_cmd, TEST_TARGET, ok("Stopped")));
    script.extend(query_steps(&commands, ""));
    let mut pm = create_pm(script);

    let state = pm.deactivate_node().await;
    assert_eq!(state, PowerState::Deleted);
    assert_eq!(state.to_string(), "deleted");
}

#[tokio::test]
async fn test_deactivate_node_fail() {
    let commands = vbox();
    let mut script = query_steps(&commands, "\"testNode\"");
    script.push(step(&commands, commands.stop_cmd, TEST_TARGET, ok("Stopped")));
    script.extend(query_steps(&commands, "\"testNode\""));
    let mut pm = create_pm(script);

    assert_eq!(pm.deactivate_node().await, PowerState::Error);
}

#[tokio::test]
async fn test_deactivate_node_already_off() {
    let commands = vbox();
    let mut script = query_steps(&commands, "\"otherNode\"");
    script.extend(query_steps(&commands, "\"otherNode\""));
    let mut pm = create_pm(script);

    assert_eq!(pm.deactivate_node().await, PowerState::Deleted);
}

#[tokio::test]
async fn test_deactivate_node_stop_fails() {
    let commands = vbox();
    let mut script = query_steps(&commands, "\"testNode\"");
    script.push(step(
        &commands,
        commands.stop_cmd,
        TEST_TARGET,
        failed("controlvm \"testNode\" poweroff"),
    ));
    let mut pm = create_pm(script);

    assert_eq!(pm.deactivate_node().await, PowerState::Error);
}

#[tokio::test]
async fn test_reboot_node() {
    let commands = vbox();
    let mut script = locate_steps(&commands);
    script.push(step(&commands, commands.reboot_cmd, TEST_TARGET, ok("Restarted")));
    script.extend(query_steps(&commands, "\"testNode\""));
    let mut pm = create_pm(script);

    assert_eq!(pm.reboot_node().await, PowerState::Active);
}

#[tokio::test]
async fn test_reboot_node_fail() {
    let commands = vbox();
    let mut script = locate_steps(&commands);
    script.push(step(&commands, commands.reboot_cmd, TEST_TARGET, ok("Restarted")));
    script.extend(query_steps(&commands, ""));
    let mut pm = create_pm(script);

    assert_eq!(pm.reboot_node().await, PowerState::Error);
}

#[tokio::test]
async fn test_reboot_node_with_exception() {
    let commands = vbox();
    let mut script = locate_steps(&commands);
    script.push(step(
        &commands,
        commands.reboot_cmd,
        TEST_TARGET,
        failed("controlvm \"testNode\" reset"),
    ));
    let mut pm = create_pm(script);

    assert_eq!(pm.reboot_node().await, PowerState::Error);
}

#[tokio::test]
async fn test_power_manager_as_trait_object() {
    let commands = vbox();
    let mut script = locate_steps(&commands);
    script.push(step(&commands, commands.start_cmd, TEST_TARGET, ok("Started")));
    script.extend(query_steps(&commands, "\"testNode\""));
    let mut pm = create_pm(script);

    let manager: &mut dyn PowerManager = &mut pm;
    assert_eq!(manager.state(), None);
    assert!(manager.start_console().await.is_ok());
    assert_eq!(manager.activate_node().await, PowerState::Active);
    assert!(manager.stop_console().await.is_ok());
    assert_eq!(manager.state(), Some(PowerState::Active));
}

#[tokio::test]
async fn test_console_without_connection() {
    let mut pm = VirtualPowerManager::with_connector(
        node_info(),
        instance_info(),
        &settings(),
        crate::core::infrastructure::remote_shell::MockConnector::new(),
    )
    .unwrap();
    assert!(pm.start_console().await.is_ok());
    assert!(pm.stop_console().await.is_ok());
    assert!(!pm.is_connected());
}

#[tokio::test]
async fn test_activate_node_hostile_name_is_quoted() {
    let commands = vbox();
    let target = "'vm; rm -rf ~'";
    let mut script = vec![
        step(&commands, commands.list_cmd, "", ok("vm; rm -rf ~")),
        step(&commands, commands.get_node_macs, target, ok("222222222222")),
        step(&commands, commands.start_cmd, target, ok("Started")),
        step(&commands, commands.list_cmd, "", ok("vm; rm -rf ~")),
        step(&commands, commands.get_node_macs, target, ok("222222222222")),
    ];
    script.push(running(&commands, "\"vm; rm -rf ~\""));
    let mut pm = create_pm(script);

    assert_eq!(pm.activate_node().await, PowerState::Active);
}

#[tokio::test]
async fn test_deactivate_node_not_found() {
    let commands = vbox();
    // Both queries find nothing, so no stop command is sent.
    let mut pm = create_pm(vec![
        step(&commands, commands.list_cmd, "", ok("")),
        step(&commands, commands.list_cmd, "", ok("")),
    ]);

    assert_eq!(pm.deactivate_node().await, PowerState::Deleted);
    assert_eq!(pm.state(), Some(PowerState::Deleted));
}
