use super::support::*;
use crate::{PowerManager, VirtualPowerManager, VirtualPowerSettings};

#[tokio::test]
async fn test_get_full_node_list() {
    let commands = vbox();
    let mut pm = create_pm(vec![step(
        &commands,
        commands.list_cmd,
        "",
        ok("testNode\n\"other vm\"\n"),
    )]);
    assert_eq!(pm.list_all_nodes().await, vec!["testNode", "other vm"]);
}

#[tokio::test]
async fn test_get_full_node_list_failure_is_empty() {
    let commands = vbox();
    let mut pm = create_pm(vec![step(
        &commands,
        commands.list_cmd,
        "",
        failed("list vms"),
    )]);
    assert!(pm.list_all_nodes().await.is_empty());
}

#[tokio::test]
async fn test_check_for_node() {
    let commands = vbox();
    let mut pm = create_pm(locate_steps(&commands));
    let name = pm.locate_node().await;
    assert_eq!(name, TEST_NODE);
    assert_eq!(pm.matched_name(), TEST_NODE);
}

#[tokio::test]
async fn test_check_for_node_accepts_any_mac_format() {
    let commands = vbox();
    let mut pm = create_pm(vec![
        step(&commands, commands.list_cmd, "", ok("testNode")),
        step(
            &commands,
            commands.get_node_macs,
            TEST_TARGET,
            ok("33-33-33-33-33-33"),
        ),
    ]);
    assert_eq!(pm.locate_node().await, TEST_NODE);
}

#[tokio::test]
async fn test_check_for_node_not_found() {
    let commands = vbox();
    let mut pm = create_pm(vec![
        step(&commands, commands.list_cmd, "", ok("testNode")),
        step(
            &commands,
            commands.get_node_macs,
            TEST_TARGET,
            ok("aabbccddeeff\nffeeddccbbaa"),
        ),
    ]);
    assert_eq!(pm.locate_node().await, "");
}

#[tokio::test]
async fn test_check_for_node_ignores_provisioning_mac() {
    // 11:11:11:11:11:11 is the node's provisioning MAC, not one of its NICs.
    let commands = vbox();
    let mut pm = create_pm(vec![
        step(&commands, commands.list_cmd, "", ok("testNode")),
        step(
            &commands,
            commands.get_node_macs,
            TEST_TARGET,
            ok("111111111111\nffeeddccbbaa"),
        ),
    ]);
    assert_eq!(pm.locate_node().await, "");
}

#[tokio::test]
async fn test_check_for_node_rejects_partial_mac() {
    let commands = vbox();
    let mut pm = create_pm(vec![
        step(&commands, commands.list_cmd, "", ok("testNode")),
        step(
            &commands,
            commands.get_node_macs,
            TEST_TARGET,
            ok("2222222222\n22222222222222\nmacaddress1"),
        ),
    ]);
    assert_eq!(pm.locate_node().await, "");
}

#[tokio::test]
async fn test_check_for_node_first_match_wins() {
    let commands = vbox();
    let mut pm = create_pm(vec![
        step(&commands, commands.list_cmd, "", ok("other\ntestNode\ntestNode-clone")),
        step(&commands, commands.get_node_macs, "'other'", ok("aabbccddeeff")),
        step(
            &commands,
            commands.get_node_macs,
            TEST_TARGET,
            ok("080027000001\n333333333333"),
        ),
    ]);
    assert_eq!(pm.locate_node().await, TEST_NODE);
}

#[tokio::test]
async fn test_check_for_node_resets_previous_match() {
    let commands = vbox();
    let mut script = locate_steps(&commands);
    script.push(step(&commands, commands.list_cmd, "", ok("")));
    let mut pm = create_pm(script);

    assert_eq!(pm.locate_node().await, TEST_NODE);
    assert_eq!(pm.locate_node().await, "");
    assert_eq!(pm.matched_name(), "");
}

#[tokio::test]
async fn test_is_power_on() {
    let commands = vbox();
    let mut script = locate_steps(&commands);
    script.push(step(&commands, commands.list_running_cmd, TEST_NODE, ok("\"testNode\"")));
    let mut pm = create_pm(script);
    assert!(pm.is_power_on().await);
}

#[tokio::test]
async fn test_is_power_on_fail() {
    let commands = vbox();
    let mut script = locate_steps(&commands);
    script.push(step(
        &commands,
        commands.list_running_cmd,
        TEST_NODE,
        ok("\"NotFoundNode\""),
    ));
    let mut pm = create_pm(script);
    assert!(!pm.is_power_on().await);
}

#[tokio::test]
async fn test_is_power_on_match_subname() {
    let commands = vbox();
    let mut script = locate_steps(&commands);
    script.push(step(
        &commands,
        commands.list_running_cmd,
        TEST_NODE,
        ok("\"testNode01\"\ntestNode01"),
    ));
    let mut pm = create_pm(script);
    assert!(!pm.query_power_state().await);
}

#[tokio::test]
async fn test_is_power_on_node_not_found() {
    let commands = vbox();
    // No running list is requested for a node that was not found.
    let mut pm = create_pm(vec![step(&commands, commands.list_cmd, "", ok(""))]);
    assert!(!pm.query_power_state().await);
}

#[tokio::test]
async fn test_is_power_on_running_list_failure() {
    let commands = vbox();
    let mut script = locate_steps(&commands);
    script.push(step(
        &commands,
        commands.list_running_cmd,
        TEST_NODE,
        failed("list runningvms"),
    ));
    let mut pm = create_pm(script);
    assert!(!pm.query_power_state().await);
}

#[tokio::test]
async fn test_is_power_on_virsh_bare_names() {
    let settings = VirtualPowerSettings {
        virtual_power_type: "virsh".to_string(),
        ..settings()
    };
    let commands = crate::Backend::Virsh.command_set();
    let shell = scripted_shell(vec![
        step(&commands, commands.list_cmd, "", ok("testNode01\ntestNode")),
        step(&commands, commands.get_node_macs, "'testNode01'", ok("525400000001")),
        step(&commands, commands.get_node_macs, TEST_TARGET, ok("222222222222")),
        step(&commands, commands.list_running_cmd, TEST_NODE, ok("testNode01\ntestNode")),
    ]);
    let mut pm = VirtualPowerManager::with_connector(
        node_info(),
        instance_info(),
        &settings,
        connector_for(shell),
    )
    .unwrap();
    assert!(pm.query_power_state().await);
}

#[tokio::test]
async fn test_check_for_node_quotes_hostile_name() {
    let hostile = "x$(touch /tmp/pwned)`id`";
    let commands = vbox();
    let mut pm = create_pm(vec![
        step(&commands, commands.list_cmd, "", ok(hostile)),
        step(
            &commands,
            commands.get_node_macs,
            "'x$(touch /tmp/pwned)`id`'",
            ok("222222222222"),
        ),
        step(&commands, commands.list_running_cmd, "", ok(hostile)),
    ]);
    assert!(pm.query_power_state().await);
    assert_eq!(pm.matched_name(), format!("\"{hostile}\""));
}

#[tokio::test]
async fn test_check_for_node_quotes_embedded_quote() {
    let commands = vbox();
    let mut pm = create_pm(vec![
        step(&commands, commands.list_cmd, "", ok("it's")),
        step(
            &commands,
            commands.get_node_macs,
            r"'it'\''s'",
            ok("333333333333"),
        ),
    ]);
    assert_eq!(pm.locate_node().await, "\"it's\"");
}
