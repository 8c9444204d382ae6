mod provisioning;
